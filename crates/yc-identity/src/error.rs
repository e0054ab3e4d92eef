//! # Identity Errors

use thiserror::Error;
use yc_core::OrgId;

/// Failures resolving or authorizing the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The identity subsystem did not supply a value.
    #[error("caller identity unavailable: {0}")]
    Unavailable(String),

    /// The encoded client id is not base64 or does not decode to UTF-8.
    #[error("failed to decode client identity: {0}")]
    Undecodable(String),

    /// The client's organization differs from the serving peer's.
    #[error("client from org {client} is not authorized to read or write private data from an org {peer} peer")]
    OrgMismatch {
        /// The submitting client's organization.
        client: OrgId,
        /// The organization operating the serving peer.
        peer: OrgId,
    },
}
