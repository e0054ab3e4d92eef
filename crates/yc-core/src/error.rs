//! # Error Types
//!
//! Leaf-level errors shared by every crate in the workspace. Built with
//! `thiserror`; no `Box<dyn Error>`.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations; use an integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation failure for identifiers and record fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string field is empty.
    #[error("{0} field must be a non-empty string")]
    EmptyField(&'static str),

    /// A numeric field is zero or negative.
    #[error("{field} field must be a positive integer, got {value}")]
    NonPositive {
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// Commitment id contains the reserved U+0000 character.
    #[error("invalid commitment id {0:?}: U+0000 is reserved for composite keys")]
    InvalidCommitmentId(String),

    /// Organization id is empty or contains whitespace/U+0000.
    #[error("invalid organization id {0:?}")]
    InvalidOrgId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_display() {
        let err = ValidationError::EmptyField("crop");
        assert_eq!(err.to_string(), "crop field must be a non-empty string");
    }

    #[test]
    fn test_non_positive_display() {
        let err = ValidationError::NonPositive { field: "size", value: -3 };
        let msg = err.to_string();
        assert!(msg.contains("size"));
        assert!(msg.contains("-3"));
    }

    #[test]
    fn test_float_rejected_display() {
        let err = CanonicalizationError::FloatRejected(1.5);
        assert!(err.to_string().contains("1.5"));
    }
}
