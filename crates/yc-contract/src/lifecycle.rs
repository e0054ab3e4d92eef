//! # Commitment Lifecycle
//!
//! Per commitment id:
//!
//! ```text
//! Absent ──create──▶ Active(owner) ──propose──▶ Active(owner, Pending(buyer))
//!                         │   ▲                         │        │
//!                      delete └───────withdraw──────────┘    transfer
//!                         ▼                                      ▼
//!                      Deleted                             Active(buyer)
//! ```
//!
//! Every operation runs inside one call against the store, which applies
//! all of the call's writes or none of them. Operations therefore check
//! everything first and write last, and never compensate for a failed
//! write.
//!
//! Reads inside a call see state as of the start of the call, so no
//! operation reads a key it has already written.

use yc_core::{ClientIdentity, CommitmentId};
use yc_identity::Caller;
use yc_store::{CollectionBackend, Partition, PartitionedStore, StateKey};

use crate::error::{ConsistencyFailure, ContractError};
use crate::payload::{CommitmentProperties, RateProposal, TransferRequest};
use crate::records::{Commitment, PrivateDetail, TransferAgreement};
use crate::verify::AgreementHashVerifier;

/// Orchestrates the commitment state machine over a partitioned store.
pub struct CommitmentLifecycleManager<'a, B> {
    pub(crate) store: &'a mut PartitionedStore<B>,
    verifier: AgreementHashVerifier,
}

impl<'a, B: CollectionBackend> CommitmentLifecycleManager<'a, B> {
    /// Operate on `store`.
    pub fn new(store: &'a mut PartitionedStore<B>) -> Self {
        Self {
            store,
            verifier: AgreementHashVerifier::new(),
        }
    }

    /// Create a commitment owned by the caller.
    ///
    /// Writes the public record to the shared partition and the rate to the
    /// caller's organization partition.
    pub fn create(&mut self, caller: &Caller, props: CommitmentProperties) -> Result<(), ContractError> {
        let key = StateKey::commitment(&props.id);
        if self.store.get(&Partition::Shared, &key)?.is_some() {
            tracing::info!(id = %props.id, "commitment already exists");
            return Err(ContractError::Conflict(format!(
                "this commitment already exists: {}",
                props.id
            )));
        }
        caller.require_same_org()?;

        let commitment = Commitment {
            object_type: props.object_type,
            id: props.id.clone(),
            location: props.location,
            size: props.size,
            crop: props.crop,
            owner: caller.identity.clone(),
        };
        let detail = PrivateDetail::new(props.id, props.rate)?;

        tracing::info!(
            collection = %self.store.naming().collection(&Partition::Shared),
            id = %commitment.id,
            owner = %commitment.owner,
            "create: put commitment"
        );
        self.store
            .put(&Partition::Shared, &key, commitment.to_bytes()?)?;

        let own = Partition::org(&caller.org);
        tracing::info!(
            collection = %self.store.naming().collection(&own),
            id = %detail.id,
            "create: put private detail"
        );
        self.store
            .put(&own, &key, detail.canonical_bytes()?.into_bytes())?;
        Ok(())
    }

    /// Record the caller's agreement to buy at the proposed rate.
    ///
    /// The proposal bytes are stored verbatim in the caller's organization
    /// partition, and the caller's identity is recorded as the pending
    /// buyer in the shared partition.
    pub fn propose_agreement(&mut self, caller: &Caller, proposal: RateProposal) -> Result<(), ContractError> {
        caller.require_same_org()?;
        let id = proposal.id().clone();
        self.require_commitment(&id)?;

        let own = Partition::org(&caller.org);
        let pending = self.agreement(&id)?;
        if let Some(agreement) = &pending {
            if agreement.buyer_id != caller.identity.as_str() {
                return Err(ContractError::Conflict(format!(
                    "a transfer agreement for {id} is already pending for another buyer"
                )));
            }
        }
        let own_detail = self.store.get(&own, id.as_str())?;
        if own_detail.is_some() && pending.is_none() {
            return Err(ContractError::Conflict(format!(
                "organization {} already holds private details for {id}",
                caller.org
            )));
        }

        let canonical = proposal.detail().canonical_bytes()?;
        if !canonical.matches(proposal.raw()) {
            tracing::warn!(
                id = %id,
                "proposal is not canonically encoded; its digest will not match a canonical owner record"
            );
        }

        tracing::info!(
            collection = %self.store.naming().collection(&own),
            id = %id,
            "propose: put private detail"
        );
        self.store.put(&own, id.as_str(), proposal.into_raw())?;

        let agreement_key = self.store.agreement_key(&id);
        tracing::info!(
            collection = %self.store.naming().collection(&Partition::Shared),
            id = %id,
            buyer = %caller.identity,
            "propose: put transfer agreement"
        );
        self.store.put(
            &Partition::Shared,
            &agreement_key,
            caller.identity.as_str().as_bytes().to_vec(),
        )?;
        Ok(())
    }

    /// Move ownership to the buyer whose proposal matches the owner's rate.
    pub fn transfer(&mut self, caller: &Caller, request: TransferRequest) -> Result<(), ContractError> {
        caller.require_same_org()?;
        let TransferRequest { id, buyer_org } = request;
        tracing::info!(id = %id, "transfer: verify commitment exists");
        let mut commitment = self.require_commitment(&id)?;

        self.verifier
            .verify(self.store, caller, &commitment, &caller.org, &buyer_org)?;

        // Checked after ownership: a non-owner is refused whatever it names.
        if buyer_org == caller.org {
            return Err(ContractError::Validation(format!(
                "buyerMSP {buyer_org} is the owner's own organization"
            )));
        }

        let agreement = self
            .agreement(&id)?
            .ok_or(ConsistencyFailure::MissingBuyerIdentity)?;
        if agreement.buyer_id.is_empty() {
            return Err(ConsistencyFailure::MissingBuyerIdentity.into());
        }
        commitment.owner = ClientIdentity::new(agreement.buyer_id)?;

        let key = StateKey::commitment(&id);
        tracing::info!(
            collection = %self.store.naming().collection(&Partition::Shared),
            id = %id,
            owner = %commitment.owner,
            "transfer: put commitment"
        );
        self.store
            .put(&Partition::Shared, &key, commitment.to_bytes()?)?;

        let own = Partition::org(&caller.org);
        tracing::info!(
            collection = %self.store.naming().collection(&own),
            id = %id,
            "transfer: delete prior owner detail"
        );
        self.store.delete(&own, &key)?;

        let agreement_key = self.store.agreement_key(&id);
        self.store.delete(&Partition::Shared, &agreement_key)?;
        Ok(())
    }

    /// Delete a commitment and the caller organization's private detail.
    pub fn delete(&mut self, caller: &Caller, id: &CommitmentId) -> Result<(), ContractError> {
        caller.require_same_org()?;
        tracing::info!(id = %id, "deleting commitment");
        let key = StateKey::commitment(id);
        if self.store.get(&Partition::Shared, &key)?.is_none() {
            return Err(ContractError::NotFound(format!("commitment not found: {id}")));
        }
        let own = Partition::org(&caller.org);
        if self.store.get(&own, &key)?.is_none() {
            return Err(ContractError::NotFound(format!(
                "commitment not found in owner's private collection {}: {id}",
                self.store.naming().collection(&own)
            )));
        }
        if self.agreement(id)?.is_some() {
            return Err(ContractError::Conflict(format!(
                "{id} has a pending transfer agreement; it must be withdrawn first"
            )));
        }

        self.store.delete(&Partition::Shared, &key)?;
        self.store.delete(&own, &key)?;
        Ok(())
    }

    /// Withdraw the caller's pending proposal.
    ///
    /// Only the buyer recorded in the agreement may withdraw it; otherwise
    /// the owner's organization could delete its own private detail here.
    pub fn withdraw_agreement(&mut self, caller: &Caller, id: &CommitmentId) -> Result<(), ContractError> {
        caller.require_same_org()?;
        let agreement = self.agreement(id)?.ok_or_else(|| {
            ContractError::NotFound(format!("commitment's transfer agreement does not exist: {id}"))
        })?;
        if agreement.buyer_id != caller.identity.as_str() {
            return Err(ContractError::Authorization(format!(
                "only the proposing buyer may withdraw the transfer agreement for {id}"
            )));
        }

        let own = Partition::org(&caller.org);
        tracing::info!(
            collection = %self.store.naming().collection(&own),
            id = %id,
            "withdrawing transfer agreement"
        );
        self.store.delete(&own, id.as_str())?;
        let agreement_key = self.store.agreement_key(id);
        self.store.delete(&Partition::Shared, &agreement_key)?;
        Ok(())
    }

    fn require_commitment(&mut self, id: &CommitmentId) -> Result<Commitment, ContractError> {
        self.read_commitment(id)?
            .ok_or_else(|| ContractError::NotFound(format!("{id} does not exist")))
    }

    pub(crate) fn agreement(&mut self, id: &CommitmentId) -> Result<Option<TransferAgreement>, ContractError> {
        let key = self.store.agreement_key(id);
        match self.store.get(&Partition::Shared, &key)? {
            Some(stored) => TransferAgreement::from_stored(id.clone(), stored)
                .map(Some)
                .map_err(|e| ContractError::corrupt("transfer agreement", &key, e)),
            None => Ok(None),
        }
    }
}
