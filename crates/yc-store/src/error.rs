//! # Store Errors

use thiserror::Error;

/// Errors raised by the store adapter and its backends.
///
/// The protocol layer propagates these unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A key read during the call was modified by another call that
    /// committed first. The caller must resubmit.
    #[error("commit conflict on {collection}/{key:?}: value changed since it was read")]
    Conflict {
        /// Collection holding the stale key.
        collection: String,
        /// The stale key.
        key: String,
    },

    /// A range scan or rich query was combined with a write in one call.
    #[error("range scans and rich queries cannot be combined with writes in the same call")]
    QueryWithWrite,

    /// The backend has no structured query support.
    #[error("rich queries are not supported by this store")]
    QueryUnsupported,

    /// A selector could not be parsed or uses unsupported constructs.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// A composite key component is not encodable.
    #[error("invalid composite key component {0:?}")]
    InvalidKey(String),

    /// The partition naming configuration is not injective or is empty.
    #[error("invalid partition naming: {0}")]
    InvalidNaming(String),

    /// Failure inside the backing store.
    #[error("backend error: {0}")]
    Backend(String),

    /// A ledger snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}
