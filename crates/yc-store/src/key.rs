//! # State Keys
//!
//! Two record kinds share the shared partition: commitments, keyed by their
//! bare id, and transfer agreements, keyed by a composite key. Composite
//! keys follow the ledger convention
//!
//! ```text
//! U+0000 ‖ kind-tag ‖ U+0000 ‖ part₁ ‖ U+0000 ‖ … ‖ partₙ ‖ U+0000
//! ```
//!
//! Commitment ids may not contain U+0000 (enforced by `CommitmentId`), so a
//! bare id never starts with the delimiter and the two key spaces are
//! disjoint. Range scans over commitments skip every key that starts with
//! U+0000.

use yc_core::CommitmentId;

use crate::error::StoreError;

const DELIMITER: char = '\u{0}';

/// Kinds of record stored under a composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A buyer's pending transfer agreement.
    TransferAgreement,
}

impl RecordKind {
    /// The namespace tag written into the key.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TransferAgreement => "transferAgreement",
        }
    }
}

/// Key composition for the shared partition.
pub struct StateKey;

impl StateKey {
    /// The key a commitment is stored under.
    pub fn commitment(id: &CommitmentId) -> String {
        id.as_str().to_string()
    }

    /// The composite key of a record of `kind` that belongs to commitment `id`.
    pub fn tagged(kind: RecordKind, id: &CommitmentId) -> String {
        // Neither the tag nor a validated id contains the delimiter.
        encode(kind.tag(), &[id.as_str()])
    }

    /// Compose an arbitrary namespaced key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if the namespace is empty or any
    /// component contains U+0000.
    pub fn compose(namespace: &str, parts: &[&str]) -> Result<String, StoreError> {
        if namespace.is_empty() || namespace.contains(DELIMITER) {
            return Err(StoreError::InvalidKey(namespace.to_string()));
        }
        if let Some(bad) = parts.iter().find(|p| p.contains(DELIMITER)) {
            return Err(StoreError::InvalidKey((*bad).to_string()));
        }
        Ok(encode(namespace, parts))
    }

    /// Split a composite key back into namespace and parts.
    ///
    /// Returns `None` for simple keys.
    pub fn split(key: &str) -> Option<(String, Vec<String>)> {
        let body = key.strip_prefix(DELIMITER)?.strip_suffix(DELIMITER)?;
        let mut components = body.split(DELIMITER).map(str::to_string);
        let namespace = components.next()?;
        Some((namespace, components.collect()))
    }

    /// Whether `key` lives in the composite key space.
    pub fn is_composite(key: &str) -> bool {
        key.starts_with(DELIMITER)
    }
}

/// The composite-key encoding. Inputs must already be delimiter-free.
fn encode(namespace: &str, parts: &[&str]) -> String {
    let len = parts.iter().map(|p| p.len() + 1).sum::<usize>() + namespace.len() + 2;
    let mut key = String::with_capacity(len);
    key.push(DELIMITER);
    key.push_str(namespace);
    key.push(DELIMITER);
    for part in parts {
        key.push_str(part);
        key.push(DELIMITER);
    }
    key
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Distinct ids produce distinct agreement keys.
        #[test]
        fn tagged_keys_injective(a in "[a-zA-Z0-9_.:-]{1,16}", b in "[a-zA-Z0-9_.:-]{1,16}") {
            prop_assume!(a != b);
            let ka = StateKey::tagged(RecordKind::TransferAgreement, &CommitmentId::new(a).unwrap());
            let kb = StateKey::tagged(RecordKind::TransferAgreement, &CommitmentId::new(b).unwrap());
            prop_assert_ne!(ka, kb);
        }

        /// No agreement key ever equals a commitment key.
        #[test]
        fn key_spaces_disjoint(a in "[a-zA-Z0-9_.:-]{1,16}", b in "[a-zA-Z0-9_.:-]{1,16}") {
            let agreement = StateKey::tagged(RecordKind::TransferAgreement, &CommitmentId::new(a).unwrap());
            let commitment = StateKey::commitment(&CommitmentId::new(b).unwrap());
            prop_assert_ne!(agreement, commitment);
        }
    }
}
