//! # Concurrent Calls
//!
//! Calls staged against the same committed state race at commit time. The
//! ledger validates every key a call read; the first commit wins and the
//! loser is rejected whole, leaving the state exactly as the winner left it.

mod common;

use std::sync::{Arc, Barrier};

use common::{caller, contract, create, identity, propose, BUYER_ORG, SELLER_ORG};
use yc_contract::{CommitmentLifecycleManager, ContractError, RateProposal, TransferRequest};
use yc_core::CommitmentId;
use yc_store::{LedgerCall, MemoryLedger, PartitionNaming, PartitionedStore, StoreError};

fn staged(ledger: &MemoryLedger) -> PartitionedStore<LedgerCall> {
    PartitionedStore::new(PartitionNaming::default(), ledger.begin())
}

fn seeded_with_proposal() -> MemoryLedger {
    let c = contract();
    c.invoke(&create("C1", 100), &identity("alice", SELLER_ORG)).unwrap();
    c.invoke(&propose("C1", 100), &identity("bob", BUYER_ORG)).unwrap();
    c.ledger().clone()
}

#[test]
fn second_of_two_staged_transfers_conflicts() {
    let ledger = seeded_with_proposal();
    let alice = caller("alice", SELLER_ORG);

    let mut first = staged(&ledger);
    let mut second = staged(&ledger);
    CommitmentLifecycleManager::new(&mut first)
        .transfer(&alice, TransferRequest::new("C1", BUYER_ORG).unwrap())
        .unwrap();
    CommitmentLifecycleManager::new(&mut second)
        .transfer(&alice, TransferRequest::new("C1", BUYER_ORG).unwrap())
        .unwrap();

    first.into_backend().commit().unwrap();
    let after_first = ledger.snapshot();

    let err = second.into_backend().commit().unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
    assert_eq!(ledger.snapshot(), after_first);
}

#[test]
fn racing_proposals_admit_one_buyer() {
    let c = contract();
    c.invoke(&create("C1", 100), &identity("alice", SELLER_ORG)).unwrap();
    let ledger = c.ledger().clone();

    let bob = caller("bob", BUYER_ORG);
    let carol = caller("carol", "Org3MSP");
    let proposal = || RateProposal::parse(br#"{"commitmentID":"C1","rate":100}"#.to_vec()).unwrap();

    let mut by_bob = staged(&ledger);
    let mut by_carol = staged(&ledger);
    CommitmentLifecycleManager::new(&mut by_bob)
        .propose_agreement(&bob, proposal())
        .unwrap();
    CommitmentLifecycleManager::new(&mut by_carol)
        .propose_agreement(&carol, proposal())
        .unwrap();

    by_bob.into_backend().commit().unwrap();
    assert!(matches!(
        by_carol.into_backend().commit(),
        Err(StoreError::Conflict { .. })
    ));

    let mut reader = staged(&ledger);
    let agreement = CommitmentLifecycleManager::new(&mut reader)
        .read_transfer_agreement(&CommitmentId::new("C1").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(agreement.buyer_id.as_str(), "x509::CN=bob");
}

#[test]
fn dispatched_transfers_from_threads_apply_once() {
    let c = contract();
    c.invoke(&create("C1", 100), &identity("alice", SELLER_ORG)).unwrap();
    c.invoke(&propose("C1", 100), &identity("bob", BUYER_ORG)).unwrap();
    let c = Arc::new(c);
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let c = Arc::clone(&c);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                c.invoke(&common::transfer("C1", BUYER_ORG), &identity("alice", SELLER_ORG))
            })
        })
        .collect();
    let results: Vec<Result<Vec<u8>, ContractError>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    // The loser lost the commit race, or read state the winner had
    // already changed.
    for err in results.into_iter().filter_map(Result::err) {
        assert!(matches!(
            err,
            ContractError::Storage(StoreError::Conflict { .. })
                | ContractError::Authorization(_)
                | ContractError::Consistency(_)
        ));
    }
    assert_eq!(c.ledger().height(), 3);
}
