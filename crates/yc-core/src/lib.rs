#![deny(missing_docs)]

//! # yc-core — Foundational Types for the Yield Commitment Protocol
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! every other crate builds on and depends on nothing internal.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** [`CommitmentId`], [`OrgId`] and
//!    [`ClientIdentity`] are distinct types validated at construction. An
//!    organization id can never be passed where a commitment id is expected.
//!
//! 2. **[`CanonicalBytes`] is the protocol's encoding of private records.**
//!    The agreement proof compares digests of two independently stored
//!    serializations, so both sides must produce the same bytes for the same
//!    value. `CanonicalBytes::new()` is the single path that guarantees it.
//!
//! 3. **Store-side digests are over stored bytes.** [`sha256_stored()`] hashes
//!    whatever bytes a partition holds, exactly as the store collaborator
//!    does. [`sha256_digest()`] is the canonical-input variant used by
//!    clients to predict the digest of a value before proposing it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `yc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_stored, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{ClientIdentity, CommitmentId, OrgId};
