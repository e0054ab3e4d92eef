//! # Collection Backend
//!
//! The physical store collaborator, addressed by collection name. The
//! ledger platform in production and [`MemoryLedger`](crate::MemoryLedger)
//! in tests both implement it.
//!
//! Methods take `&mut self`: a backend value represents one in-flight
//! call and records what the call read and wrote.

use yc_core::ContentDigest;

use crate::error::StoreError;

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Ledger height after the commit. Unchanged for read-only calls.
    pub height: u64,
    /// Number of keys written or deleted.
    pub writes: usize,
}

/// A key and the raw bytes stored under it.
pub type KeyValue = (String, Vec<u8>);

/// Key-value access to named collections within a single call.
pub trait CollectionBackend {
    /// The bytes stored under `key`, or `None`.
    fn get(&mut self, collection: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// The digest of the bytes stored under `key`, or `None`.
    ///
    /// The backend hashes the stored bytes exactly as held; it never
    /// re-encodes them.
    fn get_hash(&mut self, collection: &str, key: &str)
        -> Result<Option<ContentDigest>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&mut self, collection: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&mut self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Simple keys in `[start, end)` in key order. An empty bound is open.
    ///
    /// Composite keys are never returned.
    fn range(&mut self, collection: &str, start: &str, end: &str)
        -> Result<Vec<KeyValue>, StoreError>;

    /// Entries whose JSON value satisfies `selector`.
    fn query(&mut self, collection: &str, selector: &str) -> Result<Vec<KeyValue>, StoreError>;

    /// Whether [`query()`](Self::query) is available on this store.
    fn supports_query(&self) -> bool {
        true
    }
}

impl<B: CollectionBackend + ?Sized> CollectionBackend for &mut B {
    fn get(&mut self, collection: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(collection, key)
    }

    fn get_hash(
        &mut self,
        collection: &str,
        key: &str,
    ) -> Result<Option<ContentDigest>, StoreError> {
        (**self).get_hash(collection, key)
    }

    fn put(&mut self, collection: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(collection, key, value)
    }

    fn delete(&mut self, collection: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(collection, key)
    }

    fn range(
        &mut self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<KeyValue>, StoreError> {
        (**self).range(collection, start, end)
    }

    fn query(&mut self, collection: &str, selector: &str) -> Result<Vec<KeyValue>, StoreError> {
        (**self).query(collection, selector)
    }

    fn supports_query(&self) -> bool {
        (**self).supports_query()
    }
}

/// A call whose writes are applied together or not at all.
pub trait StagedCall: CollectionBackend {
    /// Apply every buffered write, or none of them.
    fn commit(self) -> Result<CommitReceipt, StoreError>;
}

/// A store that runs each invocation as its own [`StagedCall`].
pub trait Ledger {
    /// The call type handed to the protocol.
    type Call: StagedCall;

    /// Open a call against the current committed state.
    fn begin(&self) -> Self::Call;
}
