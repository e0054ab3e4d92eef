//! # yc-cli — Command Line for the Yield Commitment Protocol
//!
//! Provides the `yc` binary. Every subcommand builds one contract
//! [`Invocation`](yc_contract::Invocation) and runs it through the
//! dispatcher against a ledger persisted as a JSON snapshot file.
//!
//! ## Subcommands
//!
//! - `yc create` — Create a commitment with a private rate.
//! - `yc propose` — Store a buyer's rate proposal.
//! - `yc transfer` — Move ownership once both sides agree.
//! - `yc delete` / `yc withdraw` — Delete a commitment or withdraw a proposal.
//! - `yc read commitment|detail|agreement` — Point reads.
//! - `yc range` / `yc query` — Scans over the shared partition.
//!
//! ```bash
//! yc --identity 'x509::CN=alice' --org Org1MSP create --id C1 \
//!     --location field-3 --size 12 --crop maize --rate 100
//! yc --identity 'x509::CN=bob' --org Org2MSP propose --id C1 --rate 100
//! yc --identity 'x509::CN=alice' --org Org1MSP transfer --id C1 --buyer-org Org2MSP
//! yc read commitment --id C1
//! ```

pub mod commands;
pub mod ledger;
pub mod session;

pub use commands::{execute, run_command, Command};
pub use session::Session;
