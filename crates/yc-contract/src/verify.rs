//! # Agreement Hash Verifier
//!
//! Proves that the owner and the prospective buyer stored the same private
//! record without either side reading the other's partition. The store
//! hands out digests of the stored bytes, and only those are compared.
//!
//! The comparison is over serializations, not values. Both sides have to
//! use the canonical encoding for equal rates to verify.

use yc_core::OrgId;
use yc_identity::Caller;
use yc_store::{CollectionBackend, Partition, PartitionedStore};

use crate::error::{ConsistencyFailure, ContractError};
use crate::records::Commitment;

/// Digest-equality check between two organization partitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgreementHashVerifier;

impl AgreementHashVerifier {
    /// Create a verifier.
    pub fn new() -> Self {
        Self
    }

    /// Verify that `caller` owns `commitment` and that the owner's and the
    /// buyer's partitions hold byte-identical records for it.
    ///
    /// # Errors
    ///
    /// - [`ContractError::Authorization`] if the caller is not the recorded owner.
    /// - [`ContractError::Consistency`] if either record is absent or the
    ///   digests differ.
    pub fn verify<B: CollectionBackend>(
        &self,
        store: &mut PartitionedStore<B>,
        caller: &Caller,
        commitment: &Commitment,
        owner_org: &OrgId,
        buyer_org: &OrgId,
    ) -> Result<(), ContractError> {
        if caller.identity != commitment.owner {
            return Err(ContractError::Authorization(
                "submitting client identity does not own commitment".to_string(),
            ));
        }

        let key = commitment.id.as_str();
        let owner_digest = store
            .digest(&Partition::org(owner_org), key)?
            .ok_or(ConsistencyFailure::MissingOwnerDetail)?;
        let buyer_digest = store
            .digest(&Partition::org(buyer_org), key)?
            .ok_or(ConsistencyFailure::MissingBuyerProposal)?;

        if owner_digest != buyer_digest {
            tracing::info!(
                id = %commitment.id,
                owner_org = %owner_org,
                buyer_org = %buyer_org,
                "transfer verification failed: private records differ"
            );
            return Err(ConsistencyFailure::DigestMismatch.into());
        }
        tracing::debug!(
            id = %commitment.id,
            owner_org = %owner_org,
            buyer_org = %buyer_org,
            "transfer verified"
        );
        Ok(())
    }
}
