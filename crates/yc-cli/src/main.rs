//! # yc CLI entry point
//!
//! Parses global flags, initializes logging from the verbosity count, and
//! dispatches the contract subcommand.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use yc_cli::{run_command, Command, Session};

/// Yield commitment transfer protocol CLI.
///
/// Runs contract operations against a ledger kept in a local JSON snapshot.
/// Private values travel in the transient map and are never logged.
#[derive(Parser, Debug)]
#[command(name = "yc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to contract configuration (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger snapshot file. Created on the first successful write.
    #[arg(long, global = true, default_value = "yc-ledger.json")]
    ledger: PathBuf,

    /// Client identity of the caller, e.g. 'x509::CN=alice,OU=client'.
    #[arg(long, global = true)]
    identity: Option<String>,

    /// Organization of the caller.
    #[arg(long, global = true)]
    org: Option<String>,

    /// Organization of the serving peer. Defaults to --org.
    #[arg(long, global = true)]
    peer_org: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(ledger = %cli.ledger.display(), "yc CLI starting");

    let result = Session::from_flags(
        &cli.ledger,
        cli.config.as_deref(),
        cli.identity.as_deref(),
        cli.org.as_deref(),
        cli.peer_org.as_deref(),
    )
    .and_then(|session| run_command(&cli.command, &session));

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
