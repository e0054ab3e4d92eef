//! Shared fixtures for the cross-crate scenarios.
#![allow(dead_code)]

use yc_contract::payload::{
    AGREEMENT_DELETE, COMMITMENT_DELETE, COMMITMENT_OWNER, COMMITMENT_PROPERTIES, COMMITMENT_VALUE,
};
use yc_contract::{Contract, Invocation};
use yc_core::{ClientIdentity, OrgId};
use yc_identity::{Caller, StaticIdentity};
use yc_store::{MemoryLedger, PartitionNaming};

/// Organization of the seller in every scenario.
pub const SELLER_ORG: &str = "Org1MSP";
/// Organization of the buyer in every scenario.
pub const BUYER_ORG: &str = "Org2MSP";

/// `x509::CN=<name>` of `org`, calling through its own peer.
pub fn identity(name: &str, org: &str) -> StaticIdentity {
    StaticIdentity::new(
        ClientIdentity::new(format!("x509::CN={name}")).expect("identity"),
        OrgId::new(org).expect("org"),
    )
}

/// The resolved form of [`identity`].
pub fn caller(name: &str, org: &str) -> Caller {
    Caller {
        identity: ClientIdentity::new(format!("x509::CN={name}")).expect("identity"),
        org: OrgId::new(org).expect("org"),
        serving_org: OrgId::new(org).expect("org"),
    }
}

/// A contract over a fresh ledger with the default collection naming.
pub fn contract() -> Contract {
    Contract::new(PartitionNaming::default(), MemoryLedger::new())
}

/// `CreateCommitment` for a maize commitment with the given rate.
pub fn create(id: &str, rate: i64) -> Invocation {
    Invocation::new("CreateCommitment").transient(
        COMMITMENT_PROPERTIES,
        format!(
            r#"{{"objectType":"commitment","commitmentID":"{id}","location":"field-3","size":12,"crop":"maize","rate":{rate}}}"#
        ),
    )
}

/// `AgreeToTransfer` with the canonical encoding of `rate`.
pub fn propose(id: &str, rate: i64) -> Invocation {
    propose_raw(&format!(r#"{{"commitmentID":"{id}","rate":{rate}}}"#))
}

/// `AgreeToTransfer` with `raw` sent verbatim.
pub fn propose_raw(raw: &str) -> Invocation {
    Invocation::new("AgreeToTransfer").transient(COMMITMENT_VALUE, raw)
}

/// `TransferCommitment` of `id` to `buyer_org`.
pub fn transfer(id: &str, buyer_org: &str) -> Invocation {
    Invocation::new("TransferCommitment").transient(
        COMMITMENT_OWNER,
        format!(r#"{{"commitmentID":"{id}","buyerMSP":"{buyer_org}"}}"#),
    )
}

/// `DeleteCommitment` of `id`.
pub fn delete(id: &str) -> Invocation {
    Invocation::new("DeleteCommitment")
        .transient(COMMITMENT_DELETE, format!(r#"{{"commitmentID":"{id}"}}"#))
}

/// `DeleteTransferAgreement` of `id`.
pub fn withdraw(id: &str) -> Invocation {
    Invocation::new("DeleteTransferAgreement")
        .transient(AGREEMENT_DELETE, format!(r#"{{"commitmentID":"{id}"}}"#))
}
