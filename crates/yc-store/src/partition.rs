//! # Partitions and Collection Naming
//!
//! A [`Partition`] is a logical storage region: the shared partition, or
//! the private partition of one organization. [`PartitionNaming`] maps each
//! partition to the physical collection a deployment provisions for it.
//!
//! ## Injectivity
//!
//! Organization partitions are named `<OrgID><suffix>`. Because org ids
//! differ, two org partitions never share a collection. The shared
//! collection name is rejected at construction if it ends with the suffix,
//! so it can never coincide with an org partition either.

use serde::{Deserialize, Serialize};
use yc_core::OrgId;

use crate::error::StoreError;

/// Default name of the shared collection.
pub const DEFAULT_SHARED_COLLECTION: &str = "commitmentCollection";

/// Default suffix appended to an org id to name its private collection.
pub const DEFAULT_PRIVATE_SUFFIX: &str = "PrivateCollection";

/// A logical storage partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    /// Readable by every organization.
    Shared,
    /// Private to a single organization.
    Org(OrgId),
}

impl Partition {
    /// The private partition of `org`.
    pub fn org(org: &OrgId) -> Self {
        Self::Org(org.clone())
    }

    /// The owning organization, if this is a private partition.
    pub fn owner_org(&self) -> Option<&OrgId> {
        match self {
            Self::Shared => None,
            Self::Org(org) => Some(org),
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared => f.write_str("shared"),
            Self::Org(org) => write!(f, "org:{org}"),
        }
    }
}

/// Maps logical partitions to physical collection names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNaming {
    shared_collection: String,
    private_suffix: String,
}

impl PartitionNaming {
    /// Build a naming scheme.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidNaming`] if either name is empty or the
    /// shared collection name ends with the private suffix.
    pub fn new(
        shared_collection: impl Into<String>,
        private_suffix: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let shared_collection = shared_collection.into();
        let private_suffix = private_suffix.into();
        if shared_collection.is_empty() {
            return Err(StoreError::InvalidNaming(
                "shared collection name must be non-empty".to_string(),
            ));
        }
        if private_suffix.is_empty() {
            return Err(StoreError::InvalidNaming(
                "private collection suffix must be non-empty".to_string(),
            ));
        }
        if shared_collection.ends_with(&private_suffix) {
            return Err(StoreError::InvalidNaming(format!(
                "shared collection {shared_collection:?} ends with private suffix {private_suffix:?}"
            )));
        }
        Ok(Self {
            shared_collection,
            private_suffix,
        })
    }

    /// The physical collection for `partition`.
    pub fn collection(&self, partition: &Partition) -> String {
        match partition {
            Partition::Shared => self.shared_collection.clone(),
            Partition::Org(org) => format!("{}{}", org.as_str(), self.private_suffix),
        }
    }

    /// Inverse of [`collection()`](Self::collection).
    ///
    /// Returns `None` for names that no partition maps to.
    pub fn partition_of(&self, collection: &str) -> Option<Partition> {
        if collection == self.shared_collection {
            return Some(Partition::Shared);
        }
        let org = collection.strip_suffix(&self.private_suffix)?;
        OrgId::new(org).ok().map(Partition::Org)
    }

    /// The shared collection name.
    pub fn shared_collection(&self) -> &str {
        &self.shared_collection
    }

    /// The private collection suffix.
    pub fn private_suffix(&self) -> &str {
        &self.private_suffix
    }
}

impl Default for PartitionNaming {
    fn default() -> Self {
        Self {
            shared_collection: DEFAULT_SHARED_COLLECTION.to_string(),
            private_suffix: DEFAULT_PRIVATE_SUFFIX.to_string(),
        }
    }
}
