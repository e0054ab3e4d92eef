//! # Contract Errors
//!
//! Every failure aborts the whole call. [`ContractError::kind()`] gives
//! callers a stable classification independent of message wording.

use thiserror::Error;
use yc_core::{CanonicalizationError, ValidationError};
use yc_identity::IdentityError;
use yc_store::StoreError;

/// Stable classification of a [`ContractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// A record the operation requires does not exist.
    NotFound,
    /// The operation would clash with existing state.
    Conflict,
    /// The caller may not perform the operation.
    Authorization,
    /// Cross-partition state does not support the operation.
    Consistency,
    /// The store collaborator failed.
    Storage,
}

impl ErrorKind {
    /// Short name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Authorization => "authorization",
            Self::Consistency => "consistency",
            Self::Storage => "storage",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transfer could not be verified or completed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyFailure {
    /// The owner's partition holds no private detail for the commitment.
    #[error("missing owner detail")]
    MissingOwnerDetail,
    /// The buyer's partition holds no proposal for the commitment.
    #[error("missing buyer proposal")]
    MissingBuyerProposal,
    /// The two private records differ.
    #[error("mismatch")]
    DigestMismatch,
    /// No buyer identity is recorded for the commitment.
    #[error("missing buyer identity")]
    MissingBuyerIdentity,
}

/// Errors raised by protocol operations.
#[derive(Error, Debug)]
pub enum ContractError {
    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation clashes with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller may not perform the operation.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// Cross-partition state check failed.
    #[error("consistency check failed: {0}")]
    Consistency(ConsistencyFailure),

    /// Store collaborator failure, propagated unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// A record could not be encoded for storage.
    #[error("encoding error: {0}")]
    Encoding(#[from] CanonicalizationError),
}

impl ContractError {
    /// The stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::Consistency(_) => ErrorKind::Consistency,
            Self::Storage(_) | Self::Encoding(_) => ErrorKind::Storage,
        }
    }

    /// A stored record that does not decode.
    pub(crate) fn corrupt(what: &str, key: &str, reason: impl std::fmt::Display) -> Self {
        Self::Storage(StoreError::Backend(format!(
            "stored {what} under {key:?} is unreadable: {reason}"
        )))
    }
}

impl From<ValidationError> for ContractError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<IdentityError> for ContractError {
    fn from(err: IdentityError) -> Self {
        Self::Authorization(err.to_string())
    }
}

impl From<ConsistencyFailure> for ContractError {
    fn from(failure: ConsistencyFailure) -> Self {
        Self::Consistency(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yc_core::OrgId;

    #[test]
    fn test_consistency_messages() {
        assert_eq!(ConsistencyFailure::MissingOwnerDetail.to_string(), "missing owner detail");
        assert_eq!(ConsistencyFailure::MissingBuyerProposal.to_string(), "missing buyer proposal");
        assert_eq!(ConsistencyFailure::DigestMismatch.to_string(), "mismatch");
        assert_eq!(ConsistencyFailure::MissingBuyerIdentity.to_string(), "missing buyer identity");
    }

    #[test]
    fn test_identity_errors_are_authorization() {
        let err: ContractError = IdentityError::OrgMismatch {
            client: OrgId::new("Org1MSP").unwrap(),
            peer: OrgId::new("Org2MSP").unwrap(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        let err: ContractError = IdentityError::Undecodable("bad".into()).into();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_store_errors_propagate_unchanged() {
        let err: ContractError = StoreError::QueryWithWrite.into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(matches!(err, ContractError::Storage(StoreError::QueryWithWrite)));
    }

    #[test]
    fn test_validation_from_core() {
        let err: ContractError = ValidationError::EmptyField("crop").into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("crop field must be a non-empty string"));
    }
}
