//! # Records
//!
//! The three record types and their wire encodings. Field names match the
//! JSON existing clients already exchange (`commitmentID`, `buyerID`, ...).
//!
//! Records the protocol writes itself are encoded with [`CanonicalBytes`].
//! A transfer agreement is stored as the raw UTF-8 bytes of the buyer's
//! identity; [`TransferAgreement`] is only its read view.

use serde::{Deserialize, Serialize};
use yc_core::{CanonicalBytes, CanonicalizationError, ClientIdentity, CommitmentId, ValidationError};

/// Public commitment record, readable by every organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// Record type tag used by selector queries.
    #[serde(rename = "objectType")]
    pub object_type: String,
    /// Caller-assigned id.
    #[serde(rename = "commitmentID")]
    pub id: CommitmentId,
    /// Where the commitment is located.
    pub location: String,
    /// Size, always positive.
    pub size: i64,
    /// Crop, non-empty.
    pub crop: String,
    /// Identity of the current owner.
    pub owner: ClientIdentity,
}

impl Commitment {
    /// Canonical bytes for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CanonicalizationError> {
        Ok(CanonicalBytes::new(self)?.into_bytes())
    }

    /// Decode stored bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Organization-private rate attached to a commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateDetail {
    /// The commitment this rate belongs to.
    #[serde(rename = "commitmentID")]
    pub id: CommitmentId,
    /// Rate, always positive.
    pub rate: i64,
}

impl PrivateDetail {
    /// Build a detail, rejecting a non-positive rate.
    pub fn new(id: CommitmentId, rate: i64) -> Result<Self, ValidationError> {
        if rate <= 0 {
            return Err(ValidationError::NonPositive { field: "rate", value: rate });
        }
        Ok(Self { id, rate })
    }

    /// The exact bytes `create` stores for this detail.
    ///
    /// A buyer that proposes these bytes produces a digest equal to the
    /// owner's whenever the rates agree.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// Decode stored bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Read view of a pending transfer agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAgreement {
    /// The commitment the agreement refers to.
    #[serde(rename = "commitmentID")]
    pub id: CommitmentId,
    /// Identity of the proposing buyer, as stored. May be empty.
    #[serde(rename = "buyerID")]
    pub buyer_id: String,
}

impl TransferAgreement {
    /// Reconstitute the agreement from the bytes stored under its key.
    pub fn from_stored(id: CommitmentId, stored: Vec<u8>) -> Result<Self, std::string::FromUtf8Error> {
        Ok(Self {
            id,
            buyer_id: String::from_utf8(stored)?,
        })
    }
}
