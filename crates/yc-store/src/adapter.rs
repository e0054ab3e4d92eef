//! # Partitioned Store Adapter
//!
//! [`PartitionedStore`] is the partition-level view the protocol is written
//! against. It resolves each [`Partition`] to its physical collection
//! through [`PartitionNaming`] and forwards to a [`CollectionBackend`].
//! Values pass through as opaque bytes.

use yc_core::{CommitmentId, ContentDigest};

use crate::backend::{CollectionBackend, KeyValue};
use crate::error::StoreError;
use crate::key::{RecordKind, StateKey};
use crate::partition::{Partition, PartitionNaming};

/// Partition-addressed access to a collection backend.
#[derive(Debug)]
pub struct PartitionedStore<B> {
    naming: PartitionNaming,
    backend: B,
}

impl<B: CollectionBackend> PartitionedStore<B> {
    /// Wrap `backend` using `naming` to resolve partitions.
    pub fn new(naming: PartitionNaming, backend: B) -> Self {
        Self { naming, backend }
    }

    /// The naming scheme in use.
    pub fn naming(&self) -> &PartitionNaming {
        &self.naming
    }

    /// Release the backend, e.g. to commit a staged call.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// The bytes under `key` in `partition`.
    pub fn get(&mut self, partition: &Partition, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let collection = self.naming.collection(partition);
        let value = self.backend.get(&collection, key)?;
        tracing::trace!(
            collection = %collection,
            key = ?key,
            found = value.is_some(),
            "store get"
        );
        Ok(value)
    }

    /// Store `value` under `key` in `partition`.
    pub fn put(&mut self, partition: &Partition, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let collection = self.naming.collection(partition);
        tracing::trace!(collection = %collection, key = ?key, len = value.len(), "store put");
        self.backend.put(&collection, key, value)
    }

    /// Remove `key` from `partition`.
    pub fn delete(&mut self, partition: &Partition, key: &str) -> Result<(), StoreError> {
        let collection = self.naming.collection(partition);
        tracing::trace!(collection = %collection, key = ?key, "store delete");
        self.backend.delete(&collection, key)
    }

    /// The digest of the bytes under `key` in `partition`.
    pub fn digest(
        &mut self,
        partition: &Partition,
        key: &str,
    ) -> Result<Option<ContentDigest>, StoreError> {
        let collection = self.naming.collection(partition);
        self.backend.get_hash(&collection, key)
    }

    /// Simple keys of `partition` in `[start, end)`. Empty bounds are open.
    pub fn range_scan(
        &mut self,
        partition: &Partition,
        start: &str,
        end: &str,
    ) -> Result<Vec<KeyValue>, StoreError> {
        let collection = self.naming.collection(partition);
        let entries = self.backend.range(&collection, start, end)?;
        tracing::trace!(collection = %collection, hits = entries.len(), "store range scan");
        Ok(entries)
    }

    /// Entries of `partition` matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueryUnsupported`] without touching the
    /// backend if it has no structured query support.
    pub fn query(&mut self, partition: &Partition, selector: &str) -> Result<Vec<KeyValue>, StoreError> {
        if !self.backend.supports_query() {
            return Err(StoreError::QueryUnsupported);
        }
        let collection = self.naming.collection(partition);
        let entries = self.backend.query(&collection, selector)?;
        tracing::trace!(collection = %collection, hits = entries.len(), "store query");
        Ok(entries)
    }

    /// Compose a namespaced key.
    pub fn composite_key(&self, namespace: &str, parts: &[&str]) -> Result<String, StoreError> {
        StateKey::compose(namespace, parts)
    }

    /// The shared-partition key of the transfer agreement for `id`.
    pub fn agreement_key(&self, id: &CommitmentId) -> String {
        StateKey::tagged(RecordKind::TransferAgreement, id)
    }
}
