//! # Ledger File
//!
//! The CLI persists the reference ledger as a pretty JSON
//! [`LedgerSnapshot`]. A missing file is an empty ledger. Saves go through
//! a sibling temporary file and a rename so an interrupted write never
//! leaves a truncated snapshot behind. A save only lands if the file is
//! still at the height the run loaded, so interleaved runs cannot
//! silently overwrite each other's commits.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use yc_store::{LedgerSnapshot, MemoryLedger};

/// Load the ledger stored at `path`, or an empty one if the file is absent.
pub fn load_ledger(path: &Path) -> Result<MemoryLedger> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "ledger file absent, starting empty");
        return Ok(MemoryLedger::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger {}", path.display()))?;
    let snapshot = LedgerSnapshot::from_json(&text)
        .with_context(|| format!("failed to parse ledger {}", path.display()))?;
    let ledger = MemoryLedger::from_snapshot(&snapshot)
        .with_context(|| format!("failed to restore ledger {}", path.display()))?;
    tracing::debug!(path = %path.display(), height = ledger.height(), "loaded ledger");
    Ok(ledger)
}

/// Height recorded in the snapshot at `path`; an absent file is height 0.
fn stored_height(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Ok(0);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger {}", path.display()))?;
    let snapshot = LedgerSnapshot::from_json(&text)
        .with_context(|| format!("failed to parse ledger {}", path.display()))?;
    Ok(snapshot.height)
}

/// Write `ledger` to `path`, provided the file still holds the snapshot it
/// was loaded from at `base_height`.
///
/// The staging file is created exclusively and doubles as the write lock:
/// while one run holds it, another run's save fails instead of waiting.
/// A run whose base is stale fails with a conflict; the first save wins.
pub fn save_ledger(path: &Path, ledger: &MemoryLedger, base_height: u64) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let staging = path.with_extension("json.tmp");
    let file = match OpenOptions::new().write(true).create_new(true).open(&staging) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => bail!(
            "ledger conflict: {} is being written by another run (remove {} if no run is active)",
            path.display(),
            staging.display()
        ),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to create {}", staging.display()))
        }
    };
    let written = write_locked(file, path, &staging, ledger, base_height);
    if written.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    written
}

fn write_locked(
    mut file: File,
    path: &Path,
    staging: &Path,
    ledger: &MemoryLedger,
    base_height: u64,
) -> Result<()> {
    let on_disk = stored_height(path)?;
    if on_disk != base_height {
        bail!(
            "ledger conflict: {} changed since it was loaded (height {on_disk}, expected {base_height})",
            path.display()
        );
    }
    let json = ledger.snapshot().to_json_pretty()?;
    file.write_all(json.as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("failed to write {}", staging.display()))?;
    drop(file);
    std::fs::rename(staging, path)
        .with_context(|| format!("failed to replace ledger {}", path.display()))?;
    tracing::debug!(path = %path.display(), height = ledger.height(), "saved ledger");
    Ok(())
}
