//! # yc-identity — Caller Identity
//!
//! Every state-mutating operation needs three facts about the current call:
//! who submitted it, which organization they belong to, and which
//! organization operates the peer serving it. This crate obtains them from
//! an [`IdentitySource`] and resolves them once per call into a [`Caller`]
//! that the protocol threads through every operation.
//!
//! ## Organization gate
//!
//! A peer only holds the private partition of its own organization, so a
//! client may read or write private data only through a peer of its own
//! organization. [`Caller::require_same_org()`] enforces this and is
//! checked before any partition is touched.
//!
//! ## Crate Policy
//!
//! - Depends only on `yc-core` internally.
//! - Identity values are logged at `debug`; nothing else is recorded.

pub mod error;
pub mod source;
pub mod verifier;

pub use error::IdentityError;
pub use source::{IdentitySource, StaticIdentity};
pub use verifier::{Caller, IdentityVerifier};
