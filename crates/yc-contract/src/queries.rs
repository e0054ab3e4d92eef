//! # Reads and Queries
//!
//! Side-effect-free operations. An absent record is `Ok(None)`, never an
//! error. Range scans and selector queries must not share a call with a
//! write; the store rejects that combination.

use yc_core::CommitmentId;
use yc_identity::Caller;
use yc_store::{CollectionBackend, KeyValue, Partition, Selector, StateKey};

use crate::error::ContractError;
use crate::lifecycle::CommitmentLifecycleManager;
use crate::records::{Commitment, PrivateDetail, TransferAgreement};

impl<B: CollectionBackend> CommitmentLifecycleManager<'_, B> {
    /// The public record of `id`.
    pub fn read_commitment(&mut self, id: &CommitmentId) -> Result<Option<Commitment>, ContractError> {
        let key = StateKey::commitment(id);
        tracing::debug!(
            collection = %self.store.naming().collection(&Partition::Shared),
            id = %id,
            "read commitment"
        );
        let Some(bytes) = self.store.get(&Partition::Shared, &key)? else {
            tracing::debug!(id = %id, "commitment does not exist");
            return Ok(None);
        };
        Commitment::from_bytes(&bytes)
            .map(Some)
            .map_err(|e| ContractError::corrupt("commitment", &key, e))
    }

    /// The private detail of `id` held in `partition`.
    ///
    /// A peer only holds its own organization's partition, so the caller
    /// must be served by its own organization and may only name that
    /// organization's partition.
    ///
    /// # Errors
    ///
    /// - [`ContractError::Validation`] for the shared partition.
    /// - [`ContractError::Authorization`] for another organization's
    ///   partition or a cross-organization call.
    pub fn read_private_detail(
        &mut self,
        caller: &Caller,
        partition: &Partition,
        id: &CommitmentId,
    ) -> Result<Option<PrivateDetail>, ContractError> {
        caller.require_same_org()?;
        let org = partition.owner_org().ok_or_else(|| {
            ContractError::Validation(
                "private details live in an organization partition, not the shared one".to_string(),
            )
        })?;
        if *org != caller.org {
            return Err(ContractError::Authorization(format!(
                "client from org {} may not read the private partition of org {org}",
                caller.org
            )));
        }

        let collection = self.store.naming().collection(partition);
        tracing::debug!(collection = %collection, id = %id, "read private detail");
        let Some(bytes) = self.store.get(partition, id.as_str())? else {
            tracing::debug!(collection = %collection, id = %id, "private detail does not exist");
            return Ok(None);
        };
        PrivateDetail::from_bytes(&bytes)
            .map(Some)
            .map_err(|e| ContractError::corrupt("private detail", id.as_str(), e))
    }

    /// The pending transfer agreement of `id`.
    pub fn read_transfer_agreement(
        &mut self,
        id: &CommitmentId,
    ) -> Result<Option<TransferAgreement>, ContractError> {
        let agreement = self.agreement(id)?;
        if agreement.is_none() {
            tracing::debug!(id = %id, "transfer agreement does not exist");
        }
        Ok(agreement)
    }

    /// Commitments with ids in `[start, end)`. Empty bounds are open.
    pub fn range_commitments(&mut self, start: &str, end: &str) -> Result<Vec<Commitment>, ContractError> {
        let entries = self.store.range_scan(&Partition::Shared, start, end)?;
        decode_commitments(entries)
    }

    /// Commitments matching a selector document.
    pub fn query_commitments(&mut self, selector: &str) -> Result<Vec<Commitment>, ContractError> {
        let entries = self.store.query(&Partition::Shared, selector)?;
        decode_commitments(entries)
    }

    /// Commitments of `object_type` owned by `owner`.
    pub fn query_commitments_by_owner(
        &mut self,
        object_type: &str,
        owner: &str,
    ) -> Result<Vec<Commitment>, ContractError> {
        let selector = Selector::equals([("objectType", object_type), ("owner", owner)]);
        self.query_commitments(&selector.to_query_string())
    }
}

/// Decode scan results. An undecodable entry fails the whole scan.
fn decode_commitments(entries: Vec<KeyValue>) -> Result<Vec<Commitment>, ContractError> {
    entries
        .into_iter()
        .map(|(key, bytes)| {
            Commitment::from_bytes(&bytes).map_err(|e| ContractError::corrupt("commitment", &key, e))
        })
        .collect()
}
