//! # Contract Configuration
//!
//! Collection naming is a deployment concern: the shared collection and the
//! suffix of every organization's private collection must match what the
//! network provisions. Both have defaults matching the reference network.
//!
//! ```yaml
//! shared_collection: commitmentCollection
//! private_collection_suffix: PrivateCollection
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use yc_store::partition::{DEFAULT_PRIVATE_SUFFIX, DEFAULT_SHARED_COLLECTION};
use yc_store::{PartitionNaming, StoreError};

/// Errors loading a [`ContractConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The YAML is malformed or has unknown keys.
    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The naming is empty or not injective.
    #[error("invalid config: {0}")]
    Invalid(#[from] StoreError),
}

/// Deployment settings for the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractConfig {
    /// Name of the collection readable by every organization.
    pub shared_collection: String,
    /// Suffix appended to an organization id to name its private collection.
    pub private_collection_suffix: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            shared_collection: DEFAULT_SHARED_COLLECTION.to_string(),
            private_collection_suffix: DEFAULT_PRIVATE_SUFFIX.to_string(),
        }
    }
}

impl ContractConfig {
    /// Parse and validate YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.naming()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            shared = %config.shared_collection,
            suffix = %config.private_collection_suffix,
            "loaded contract config"
        );
        Ok(config)
    }

    /// The partition naming described by this config.
    pub fn naming(&self) -> Result<PartitionNaming, StoreError> {
        PartitionNaming::new(
            self.shared_collection.clone(),
            self.private_collection_suffix.clone(),
        )
    }
}
