//! # Canonical Serialization — JCS Byte Production
//!
//! Defines [`CanonicalBytes`], the encoding the protocol uses for every
//! record it writes itself and the encoding a buyer must reproduce when
//! proposing an agreement.
//!
//! ## Why the encoding matters
//!
//! Agreement on a private rate is proven by comparing the store's digests of
//! two independently written values. Two JSON documents that carry the same
//! rate but differ in key order, whitespace or number formatting hash
//! differently. Routing both sides through `CanonicalBytes::new()` makes
//! "same value" and "same bytes" coincide.
//!
//! ## Rules
//!
//! 1. **Reject floats.** Rates and sizes are integers. Float formatting has
//!    edge cases that would make equal values hash differently.
//! 2. **Sorted keys, compact separators.** Serialization uses `serde_jcs`
//!    (RFC 8785).
//! 3. **UTF-8 passthrough.** Non-ASCII strings are emitted as UTF-8, not
//!    escaped.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization with float rejection.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new()`].
/// - All numbers are integers.
/// - Object keys are sorted, separators compact.
///
/// The inner `Vec<u8>` is private, so downstream code cannot build a value
/// that violates these rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the value contains
    /// a non-integer number, and [`CanonicalizationError::SerializationFailed`]
    /// if JSON or JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let checked = reject_floats(value)?;
        let s = serde_jcs::to_string(&checked)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the wrapper, yielding the bytes for storage.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `raw` is byte-identical to this canonical encoding.
    pub fn matches(&self, raw: &[u8]) -> bool {
        self.0 == raw
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively walk a JSON value, rejecting any number that is not
/// representable as `i64` or `u64`.
fn reject_floats(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut checked = serde_json::Map::new();
            for (k, v) in map {
                checked.insert(k, reject_floats(v)?);
            }
            Ok(Value::Object(checked))
        }
        Value::Array(arr) => {
            let checked: Result<Vec<_>, _> = arr.into_iter().map(reject_floats).collect();
            Ok(Value::Array(checked?))
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Same rate, same id: always the same bytes.
        #[test]
        fn canonical_detail_deterministic(id in "[A-Za-z0-9_-]{1,24}", rate in 1i64..i64::MAX) {
            let a = CanonicalBytes::new(&serde_json::json!({"commitmentID": id, "rate": rate})).unwrap();
            let b = CanonicalBytes::new(&serde_json::json!({"rate": rate, "commitmentID": id})).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// Different rates never collide in encoding.
        #[test]
        fn canonical_detail_distinguishes_rates(rate in 1i64..1_000_000, delta in 1i64..1000) {
            let a = CanonicalBytes::new(&serde_json::json!({"commitmentID": "C", "rate": rate})).unwrap();
            let b = CanonicalBytes::new(&serde_json::json!({"commitmentID": "C", "rate": rate + delta})).unwrap();
            prop_assert_ne!(a.as_bytes(), b.as_bytes());
        }

        /// Canonical bytes always parse back as JSON.
        #[test]
        fn canonical_bytes_valid_json(
            keys in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6)
        ) {
            let cb = CanonicalBytes::new(&keys).unwrap();
            let parsed: Result<Value, _> = serde_json::from_slice(cb.as_bytes());
            prop_assert!(parsed.is_ok());
        }

        /// Any non-integral float is rejected.
        #[test]
        fn float_always_rejected(f in any::<f64>().prop_filter("not integer", |f| {
            f.fract() != 0.0 && f.is_finite()
        })) {
            let data = serde_json::json!({"rate": f});
            prop_assert!(CanonicalBytes::new(&data).is_err());
        }
    }
}
