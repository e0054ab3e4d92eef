//! # Private Payloads
//!
//! Private inputs travel in a [`TransientMap`] next to the public
//! arguments of an invocation. They live for one call and are never
//! logged; `Debug` for the map shows key names only.
//!
//! Each operation's input is decoded from its transient key into a raw
//! struct whose missing fields default to empty or zero, and then
//! validated into a typed request. That way a missing field and an empty
//! one produce the same validation error.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use yc_core::{CommitmentId, OrgId, ValidationError};

use crate::error::ContractError;
use crate::records::PrivateDetail;

/// Transient key carrying [`CommitmentProperties`].
pub const COMMITMENT_PROPERTIES: &str = "commitment_properties";
/// Transient key carrying a [`RateProposal`].
pub const COMMITMENT_VALUE: &str = "commitment_value";
/// Transient key carrying a [`TransferRequest`].
pub const COMMITMENT_OWNER: &str = "commitment_owner";
/// Transient key carrying the [`CommitmentReference`] to delete.
pub const COMMITMENT_DELETE: &str = "commitment_delete";
/// Transient key carrying the [`CommitmentReference`] of an agreement to withdraw.
pub const AGREEMENT_DELETE: &str = "agreement_delete";

/// Out-of-band private inputs of one invocation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TransientMap(BTreeMap<String, Vec<u8>>);

impl TransientMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.0.insert(key.into(), value.into());
    }

    /// The raw bytes under `key`.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// The raw bytes under `key`, or a validation error naming it.
    pub fn require(&self, key: &str) -> Result<&[u8], ContractError> {
        self.get(key).ok_or_else(|| {
            ContractError::Validation(format!("{key} key not found in the transient map"))
        })
    }

    /// Decode the JSON under `key`.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<T, ContractError> {
        let raw = self.require(key)?;
        serde_json::from_slice(raw)
            .map_err(|e| ContractError::Validation(format!("failed to unmarshal {key}: {e}")))
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for TransientMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(value)
}

fn positive(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositive { field, value });
    }
    Ok(value)
}

// ── Create ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawProperties {
    #[serde(rename = "objectType")]
    object_type: String,
    #[serde(rename = "commitmentID")]
    id: String,
    location: String,
    size: i64,
    crop: String,
    rate: i64,
}

/// Validated input of `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentProperties {
    /// Record type tag.
    pub object_type: String,
    /// New commitment id.
    pub id: CommitmentId,
    /// Location, non-empty.
    pub location: String,
    /// Size, positive.
    pub size: i64,
    /// Crop, non-empty.
    pub crop: String,
    /// Private rate, positive.
    pub rate: i64,
}

impl CommitmentProperties {
    /// Validate each field.
    pub fn new(
        object_type: impl Into<String>,
        id: impl Into<String>,
        location: impl Into<String>,
        size: i64,
        crop: impl Into<String>,
        rate: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            object_type: non_empty("objectType", object_type.into())?,
            id: CommitmentId::new(id)?,
            location: non_empty("location", location.into())?,
            size: positive("size", size)?,
            crop: non_empty("crop", crop.into())?,
            rate: positive("rate", rate)?,
        })
    }

    /// Decode and validate from the transient map.
    pub fn from_transient(transient: &TransientMap) -> Result<Self, ContractError> {
        let raw: RawProperties = transient.decode(COMMITMENT_PROPERTIES)?;
        Ok(Self::new(
            raw.object_type,
            raw.id,
            raw.location,
            raw.size,
            raw.crop,
            raw.rate,
        )?)
    }
}

// ── Propose ───────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawRate {
    #[serde(rename = "commitmentID")]
    id: String,
    rate: i64,
}

/// A buyer's proposed rate: the exact bytes to store plus the values
/// parsed from them.
#[derive(Clone, PartialEq, Eq)]
pub struct RateProposal {
    raw: Vec<u8>,
    id: CommitmentId,
    rate: i64,
}

impl RateProposal {
    /// Parse and validate caller-supplied bytes, keeping them verbatim.
    pub fn parse(raw: Vec<u8>) -> Result<Self, ContractError> {
        let parsed: RawRate = serde_json::from_slice(&raw)
            .map_err(|e| ContractError::Validation(format!("failed to unmarshal {COMMITMENT_VALUE}: {e}")))?;
        let id = CommitmentId::new(parsed.id)?;
        let rate = positive("rate", parsed.rate)?;
        Ok(Self { raw, id, rate })
    }

    /// A proposal whose bytes are the canonical encoding of `detail`.
    pub fn canonical(detail: &PrivateDetail) -> Result<Self, ContractError> {
        Ok(Self {
            raw: detail.canonical_bytes()?.into_bytes(),
            id: detail.id.clone(),
            rate: positive("rate", detail.rate)?,
        })
    }

    /// Decode from the transient map.
    pub fn from_transient(transient: &TransientMap) -> Result<Self, ContractError> {
        Self::parse(transient.require(COMMITMENT_VALUE)?.to_vec())
    }

    /// The bytes that will be stored.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The commitment the proposal is for.
    pub fn id(&self) -> &CommitmentId {
        &self.id
    }

    /// The proposed rate.
    pub fn rate(&self) -> i64 {
        self.rate
    }

    /// The parsed value as a detail record.
    pub fn detail(&self) -> PrivateDetail {
        PrivateDetail {
            id: self.id.clone(),
            rate: self.rate,
        }
    }

    pub(crate) fn into_raw(self) -> Vec<u8> {
        self.raw
    }
}

impl std::fmt::Debug for RateProposal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateProposal")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ── Transfer ──────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTransfer {
    #[serde(rename = "commitmentID")]
    id: String,
    #[serde(rename = "buyerMSP")]
    buyer_org: String,
}

/// Validated input of `transfer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// The commitment to transfer.
    pub id: CommitmentId,
    /// The buyer's organization.
    pub buyer_org: OrgId,
}

impl TransferRequest {
    /// Validate both fields.
    pub fn new(id: impl Into<String>, buyer_org: impl Into<String>) -> Result<Self, ValidationError> {
        let id = CommitmentId::new(id)?;
        let buyer_org = OrgId::new(non_empty("buyerMSP", buyer_org.into())?)?;
        Ok(Self { id, buyer_org })
    }

    /// Decode and validate from the transient map.
    pub fn from_transient(transient: &TransientMap) -> Result<Self, ContractError> {
        let raw: RawTransfer = transient.decode(COMMITMENT_OWNER)?;
        Ok(Self::new(raw.id, raw.buyer_org)?)
    }
}

// ── Delete / withdraw ─────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawReference {
    #[serde(rename = "commitmentID")]
    id: String,
}

/// A bare commitment reference, used by `delete` and `withdraw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentReference {
    /// The referenced commitment.
    pub id: CommitmentId,
}

impl CommitmentReference {
    /// Decode and validate the reference under `key`.
    pub fn from_transient(transient: &TransientMap, key: &str) -> Result<Self, ContractError> {
        let raw: RawReference = transient.decode(key)?;
        Ok(Self {
            id: CommitmentId::new(raw.id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn transient(key: &str, json: &str) -> TransientMap {
        let mut map = TransientMap::new();
        map.insert(key, json.as_bytes());
        map
    }

    #[test]
    fn test_properties_from_transient() {
        let map = transient(
            COMMITMENT_PROPERTIES,
            r#"{"objectType":"commitment","commitmentID":"C1","location":"field-3","size":12,"crop":"maize","rate":100}"#,
        );
        let props = CommitmentProperties::from_transient(&map).unwrap();
        assert_eq!(props.id.as_str(), "C1");
        assert_eq!(props.rate, 100);
    }

    #[test]
    fn test_properties_missing_field_is_empty_field() {
        let map = transient(
            COMMITMENT_PROPERTIES,
            r#"{"objectType":"commitment","commitmentID":"C1","size":12,"crop":"maize","rate":100}"#,
        );
        let err = CommitmentProperties::from_transient(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("location field must be a non-empty string"));
    }

    #[test]
    fn test_properties_non_positive() {
        assert!(CommitmentProperties::new("c", "C1", "l", 0, "m", 1).is_err());
        assert!(CommitmentProperties::new("c", "C1", "l", 1, "m", -5).is_err());
        assert!(CommitmentProperties::new("c", "C1", "l", 1, "", 1).is_err());
        assert!(CommitmentProperties::new("", "C1", "l", 1, "m", 1).is_err());
    }

    #[test]
    fn test_missing_transient_key() {
        let err = CommitmentProperties::from_transient(&TransientMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains(COMMITMENT_PROPERTIES));
    }

    #[test]
    fn test_malformed_json() {
        let map = transient(COMMITMENT_OWNER, "{not json");
        let err = TransferRequest::from_transient(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_float_rate_rejected() {
        let err = RateProposal::parse(br#"{"commitmentID":"C1","rate":100.5}"#.to_vec()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_proposal_keeps_bytes_verbatim() {
        let raw = br#"{ "rate" : 100, "commitmentID" : "C1" }"#.to_vec();
        let proposal = RateProposal::parse(raw.clone()).unwrap();
        assert_eq!(proposal.raw(), raw.as_slice());
        assert_eq!(proposal.rate(), 100);
        assert_eq!(proposal.id().as_str(), "C1");
    }

    #[test]
    fn test_canonical_proposal_matches_detail_bytes() {
        let detail = PrivateDetail::new(CommitmentId::new("C1").unwrap(), 100).unwrap();
        let proposal = RateProposal::canonical(&detail).unwrap();
        assert_eq!(proposal.raw(), br#"{"commitmentID":"C1","rate":100}"#);
        assert_eq!(proposal.detail(), detail);
    }

    #[test]
    fn test_transfer_request_validation() {
        assert!(TransferRequest::new("C1", "Org2MSP").is_ok());
        assert_eq!(
            TransferRequest::new("C1", "").unwrap_err(),
            ValidationError::EmptyField("buyerMSP")
        );
        assert!(TransferRequest::new("", "Org2MSP").is_err());
        assert!(TransferRequest::new("C1", "Org 2").is_err());
    }

    #[test]
    fn test_reference_requires_id() {
        let err = CommitmentReference::from_transient(&transient(AGREEMENT_DELETE, "{}"), AGREEMENT_DELETE)
            .unwrap_err();
        assert!(err.to_string().contains("commitmentID field must be a non-empty string"));
    }

    #[test]
    fn test_debug_hides_private_values() {
        let map = transient(COMMITMENT_VALUE, r#"{"commitmentID":"C1","rate":4242}"#);
        let rendered = format!("{map:?}");
        assert!(rendered.contains(COMMITMENT_VALUE));
        assert!(!rendered.contains("4242"));

        let proposal = RateProposal::from_transient(&map).unwrap();
        assert!(!format!("{proposal:?}").contains("4242"));
    }
}
