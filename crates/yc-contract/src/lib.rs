//! # yc-contract — Yield Commitment Transfer Protocol
//!
//! A commitment has a public record in the shared partition and a private
//! rate held only in its owner's organization partition. Ownership moves
//! when buyer and seller have independently stored the same private value,
//! proven by comparing the store's digests of the two records. Neither side
//! discloses the value.
//!
//! ## Components
//!
//! - [`AgreementHashVerifier`] (`verify.rs`): the digest-equality proof.
//! - [`CommitmentLifecycleManager`] (`lifecycle.rs`, `queries.rs`): create,
//!   propose, transfer, delete, withdraw, and the side-effect-free reads.
//! - [`Contract`] (`dispatch.rs`): routes a named [`Invocation`] to the
//!   manager inside one staged ledger call and commits it iff the operation
//!   succeeded.
//!
//! ## Private inputs
//!
//! Rates and transfer parameters arrive in the [`TransientMap`], separate
//! from the public arguments. Its contents are never logged.
//!
//! ## Crate Policy
//!
//! - Every mutating operation checks the caller's organization against the
//!   serving organization before touching a partition.
//! - All failures abort the whole call. There are no compensating writes.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod payload;
pub mod queries;
pub mod records;
pub mod verify;

pub use config::{ConfigError, ContractConfig};
pub use dispatch::{Contract, Function, Invocation};
pub use error::{ConsistencyFailure, ContractError, ErrorKind};
pub use lifecycle::CommitmentLifecycleManager;
pub use payload::{
    CommitmentProperties, CommitmentReference, RateProposal, TransferRequest, TransientMap,
};
pub use records::{Commitment, PrivateDetail, TransferAgreement};
pub use verify::AgreementHashVerifier;
