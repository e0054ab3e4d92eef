//! # yc-store — Partitioned Store Adapter
//!
//! The protocol reads and writes three logically independent partitions:
//! the shared partition visible to every organization, and one private
//! partition per organization. This crate is the only place that knows how
//! those partitions map onto the physical store.
//!
//! ## Layers
//!
//! - **Partition** (`partition.rs`): the logical partition enum and the
//!   total, injective [`PartitionNaming`] function that turns it into a
//!   collection name.
//!
//! - **Keys** (`key.rs`): [`StateKey`] composes record-kind-tagged keys so
//!   transfer agreements live outside the commitment-id key range.
//!
//! - **Backend** (`backend.rs`): the [`CollectionBackend`] collaborator
//!   trait, addressed by physical collection name, and the [`Ledger`] /
//!   [`StagedCall`] pair that opens and commits one call. A ledger client
//!   or a test double implements them.
//!
//! - **Adapter** (`adapter.rs`): [`PartitionedStore`], the partition-level
//!   API the protocol is written against.
//!
//! - **Memory** (`memory.rs`): [`MemoryLedger`], a reference backend. Each
//!   call is staged in a [`LedgerCall`] and committed atomically, with
//!   read-set validation standing in for the ledger's conflict detection.
//!
//! ## Crate Policy
//!
//! - Depends only on `yc-core` internally.
//! - The adapter never decodes record bytes; it moves opaque values.

pub mod adapter;
pub mod backend;
pub mod error;
pub mod key;
pub mod memory;
pub mod partition;
pub mod selector;

pub use adapter::PartitionedStore;
pub use backend::{CollectionBackend, CommitReceipt, KeyValue, Ledger, StagedCall};
pub use error::StoreError;
pub use key::{RecordKind, StateKey};
pub use memory::{LedgerCall, LedgerSnapshot, MemoryLedger};
pub use partition::{Partition, PartitionNaming};
pub use selector::Selector;
