//! # Identifier Newtypes
//!
//! Each identifier is a distinct type: a [`CommitmentId`] cannot be passed
//! where an [`OrgId`] is expected. All three are string-based and validated
//! at construction, including when deserialized.
//!
//! ## Reserved characters
//!
//! U+0000 delimits the components of composite keys in the shared
//! partition. Forbidding it in commitment ids and organization ids keeps
//! plain commitment keys and composite keys in disjoint namespaces.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const KEY_DELIMITER: char = '\u{0}';

/// Caller-assigned, globally unique identifier of a commitment.
///
/// # Validation
///
/// - Must be non-empty.
/// - Must not contain U+0000.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitmentId(String);

impl CommitmentId {
    /// Create a commitment id, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyField`] for an empty string and
    /// [`ValidationError::InvalidCommitmentId`] if it contains U+0000.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyField("commitmentID"));
        }
        if s.contains(KEY_DELIMITER) {
            return Err(ValidationError::InvalidCommitmentId(s));
        }
        Ok(Self(s))
    }

    /// Access the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitmentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommitmentId> for String {
    fn from(id: CommitmentId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CommitmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an organization (the membership service provider id).
///
/// # Validation
///
/// - Must be non-empty.
/// - Must not contain whitespace or U+0000.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrgId(String);

impl OrgId {
    /// Create an organization id, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidOrgId`] if the value is empty or
    /// contains whitespace or U+0000.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == KEY_DELIMITER) {
            return Err(ValidationError::InvalidOrgId(s));
        }
        Ok(Self(s))
    }

    /// Access the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrgId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrgId> for String {
    fn from(id: OrgId) -> Self {
        id.0
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded, organization-scoped identity of a submitting client.
///
/// This is the string recorded as a commitment's `owner`, typically an
/// X.509 subject/issuer pair such as
/// `x509::CN=buyer,OU=client::CN=ca.org2.example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Create a client identity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyField`] for an empty string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyField("owner"));
        }
        Ok(Self(s))
    }

    /// Access the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClientIdentity {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientIdentity> for String {
    fn from(id: ClientIdentity) -> Self {
        id.0
    }
}

impl std::fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
