//! # In-Memory Ledger
//!
//! A reference [`CollectionBackend`] with the call semantics the protocol
//! depends on.
//!
//! ## Staged calls
//!
//! [`MemoryLedger::begin()`] opens a [`LedgerCall`]. Reads inside the call
//! observe committed state only; a value written earlier in the same call
//! is not visible until commit. Writes and deletes are buffered and applied
//! together by [`LedgerCall::commit()`] under a single write lock, or
//! discarded when the call is dropped.
//!
//! ## Conflict detection
//!
//! Every committed key carries the ledger height at which it was last
//! written. A call remembers the version of each key it read, including
//! keys that were absent and keys whose digest it read. At commit, any
//! difference from the current version fails the whole call with
//! [`StoreError::Conflict`]. The first of two racing calls wins.
//!
//! ## Thread safety
//!
//! `MemoryLedger` is `Send + Sync` and cheap to clone: clones share the
//! same `Arc<RwLock<..>>`. Calls take the read lock per operation and only
//! `commit()` takes the write lock. The lock is `parking_lot`, never held
//! across a call boundary.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use yc_core::{sha256_stored, ContentDigest};

use crate::backend::{CollectionBackend, CommitReceipt, KeyValue, Ledger, StagedCall};
use crate::error::StoreError;
use crate::key::StateKey;
use crate::selector::Selector;

#[derive(Debug, Clone)]
struct Versioned {
    value: Vec<u8>,
    version: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
    collections: BTreeMap<String, BTreeMap<String, Versioned>>,
    height: u64,
}

impl LedgerState {
    fn entry(&self, collection: &str, key: &str) -> Option<&Versioned> {
        self.collections.get(collection)?.get(key)
    }
}

/// Shared in-memory ledger.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    inner: Arc<RwLock<LedgerState>>,
    rich_queries: bool,
}

impl MemoryLedger {
    /// Create an empty ledger with selector query support.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerState::default())),
            rich_queries: true,
        }
    }

    /// Create an empty ledger whose calls reject [`CollectionBackend::query`]
    /// with [`StoreError::QueryUnsupported`], like a key-value-only state
    /// database.
    pub fn without_rich_queries() -> Self {
        Self {
            rich_queries: false,
            ..Self::new()
        }
    }

    /// Open a staged call against the current committed state.
    pub fn begin(&self) -> LedgerCall {
        LedgerCall {
            ledger: self.clone(),
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
            scanned: false,
        }
    }

    /// Number of calls with writes committed so far.
    pub fn height(&self) -> u64 {
        self.inner.read().height
    }

    /// The committed bytes under `key`, outside of any call.
    pub fn committed(&self, collection: &str, key: &str) -> Option<Vec<u8>> {
        self.inner
            .read()
            .entry(collection, key)
            .map(|v| v.value.clone())
    }

    /// Committed keys of `collection`, in key order.
    pub fn keys(&self, collection: &str) -> Vec<String> {
        self.inner
            .read()
            .collections
            .get(collection)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Capture the committed state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.inner.read();
        let collections = state
            .collections
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(name, entries)| {
                let encoded = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), STANDARD.encode(&v.value)))
                    .collect();
                (name.clone(), encoded)
            })
            .collect();
        LedgerSnapshot {
            height: state.height,
            rich_queries: self.rich_queries,
            collections,
        }
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// Every restored key gets the snapshot height as its version. Query
    /// support is restored as captured.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] if a value is not valid base64.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, StoreError> {
        let mut state = LedgerState {
            collections: BTreeMap::new(),
            height: snapshot.height,
        };
        for (name, entries) in &snapshot.collections {
            let mut restored = BTreeMap::new();
            for (key, encoded) in entries {
                let value = STANDARD.decode(encoded).map_err(|e| {
                    StoreError::Snapshot(format!("value of {name}/{key:?} is not base64: {e}"))
                })?;
                restored.insert(
                    key.clone(),
                    Versioned {
                        value,
                        version: snapshot.height,
                    },
                );
            }
            state.collections.insert(name.clone(), restored);
        }
        Ok(Self {
            inner: Arc::new(RwLock::new(state)),
            rich_queries: snapshot.rich_queries,
        })
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

type SlotKey = (String, String);

/// One in-flight call against a [`MemoryLedger`].
#[derive(Debug)]
pub struct LedgerCall {
    ledger: MemoryLedger,
    reads: BTreeMap<SlotKey, Option<u64>>,
    writes: BTreeMap<SlotKey, Option<Vec<u8>>>,
    scanned: bool,
}

impl LedgerCall {
    /// Number of buffered writes and deletes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    fn read_slot(&mut self, collection: &str, key: &str) -> Option<Vec<u8>> {
        let state = self.ledger.inner.read();
        let entry = state.entry(collection, key);
        self.reads
            .entry((collection.to_string(), key.to_string()))
            .or_insert(entry.map(|v| v.version));
        entry.map(|v| v.value.clone())
    }

    fn stage(
        &mut self,
        collection: &str,
        key: &str,
        value: Option<Vec<u8>>,
    ) -> Result<(), StoreError> {
        if self.scanned {
            return Err(StoreError::QueryWithWrite);
        }
        self.writes
            .insert((collection.to_string(), key.to_string()), value);
        Ok(())
    }

    fn begin_scan(&mut self) -> Result<(), StoreError> {
        if !self.writes.is_empty() {
            return Err(StoreError::QueryWithWrite);
        }
        self.scanned = true;
        Ok(())
    }

    fn simple_entries(
        &mut self,
        collection: &str,
        lower: Bound<&str>,
        upper: Bound<&str>,
    ) -> Result<Vec<KeyValue>, StoreError> {
        self.begin_scan()?;
        let state = self.ledger.inner.read();
        let Some(entries) = state.collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(entries
            .range::<str, _>((lower, upper))
            .filter(|(k, _)| !StateKey::is_composite(k))
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect())
    }

    /// Validate the read set and apply all buffered writes atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if any key read by this call was
    /// changed by a call that committed after it was read. Nothing is
    /// applied in that case.
    pub fn commit(self) -> Result<CommitReceipt, StoreError> {
        let mut state = self.ledger.inner.write();
        for ((collection, key), seen) in &self.reads {
            let current = state.entry(collection, key).map(|v| v.version);
            if current != *seen {
                tracing::warn!(
                    collection = %collection,
                    key = ?key,
                    "commit rejected: key changed since it was read"
                );
                return Err(StoreError::Conflict {
                    collection: collection.clone(),
                    key: key.clone(),
                });
            }
        }
        let writes = self.writes.len();
        if writes == 0 {
            return Ok(CommitReceipt {
                height: state.height,
                writes,
            });
        }
        state.height += 1;
        let version = state.height;
        for ((collection, key), value) in self.writes {
            match value {
                Some(value) => {
                    state
                        .collections
                        .entry(collection)
                        .or_default()
                        .insert(key, Versioned { value, version });
                }
                None => {
                    if let Some(entries) = state.collections.get_mut(&collection) {
                        entries.remove(&key);
                    }
                }
            }
        }
        tracing::debug!(height = version, writes, "ledger call committed");
        Ok(CommitReceipt {
            height: version,
            writes,
        })
    }
}

impl CollectionBackend for LedgerCall {
    fn get(&mut self, collection: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read_slot(collection, key))
    }

    fn get_hash(
        &mut self,
        collection: &str,
        key: &str,
    ) -> Result<Option<ContentDigest>, StoreError> {
        Ok(self.read_slot(collection, key).map(|v| sha256_stored(&v)))
    }

    fn put(&mut self, collection: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.stage(collection, key, Some(value))
    }

    fn delete(&mut self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.stage(collection, key, None)
    }

    fn range(
        &mut self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<KeyValue>, StoreError> {
        if !start.is_empty() && !end.is_empty() && start >= end {
            self.begin_scan()?;
            return Ok(Vec::new());
        }
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };
        self.simple_entries(collection, lower, upper)
    }

    fn query(&mut self, collection: &str, selector: &str) -> Result<Vec<KeyValue>, StoreError> {
        if !self.ledger.rich_queries {
            return Err(StoreError::QueryUnsupported);
        }
        let selector = Selector::parse(selector)?;
        let entries = self.simple_entries(collection, Bound::Unbounded, Bound::Unbounded)?;
        Ok(entries
            .into_iter()
            .filter(|(_, value)| {
                serde_json::from_slice::<serde_json::Value>(value)
                    .map(|doc| selector.matches(&doc))
                    .unwrap_or(false)
            })
            .collect())
    }

    fn supports_query(&self) -> bool {
        self.ledger.rich_queries
    }
}

impl Ledger for MemoryLedger {
    type Call = LedgerCall;

    fn begin(&self) -> LedgerCall {
        MemoryLedger::begin(self)
    }
}

impl StagedCall for LedgerCall {
    fn commit(self) -> Result<CommitReceipt, StoreError> {
        LedgerCall::commit(self)
    }
}

/// Serializable image of a ledger's committed state.
///
/// Values are base64-encoded so arbitrary bytes survive JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Ledger height at capture time.
    pub height: u64,
    /// Whether the ledger answers selector queries. Absent in older
    /// snapshots, which were always taken from query-capable ledgers.
    #[serde(default = "rich_queries_default")]
    pub rich_queries: bool,
    /// Collection name → key → base64 value.
    pub collections: BTreeMap<String, BTreeMap<String, String>>,
}

fn rich_queries_default() -> bool {
    true
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            height: 0,
            rich_queries: rich_queries_default(),
            collections: BTreeMap::new(),
        }
    }
}

impl LedgerSnapshot {
    /// Pretty JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    /// Parse a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] for malformed input.
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        serde_json::from_str(text).map_err(|e| StoreError::Snapshot(e.to_string()))
    }
}
