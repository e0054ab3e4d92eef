//! # Selector Matching
//!
//! The reference ledger understands one query shape: field equality.
//!
//! ```json
//! {"selector": {"objectType": "commitment", "owner": "x509::CN=a"}}
//! ```
//!
//! Every field must be present in the record with an equal scalar value.
//! Operators, nested documents, arrays, and any top-level key other than
//! `selector` are rejected so that a query never silently matches more
//! than the caller asked for.

use serde_json::{Map, Value};

use crate::error::StoreError;

/// A parsed field-equality selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    fields: Map<String, Value>,
}

impl Selector {
    /// Parse a selector document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSelector`] for malformed JSON or any
    /// construct beyond scalar field equality.
    pub fn parse(text: &str) -> Result<Self, StoreError> {
        let doc: Value = serde_json::from_str(text)
            .map_err(|e| StoreError::InvalidSelector(format!("not JSON: {e}")))?;
        let Value::Object(mut top) = doc else {
            return Err(StoreError::InvalidSelector(
                "query must be a JSON object".to_string(),
            ));
        };
        let selector = top
            .remove("selector")
            .ok_or_else(|| StoreError::InvalidSelector("missing \"selector\"".to_string()))?;
        if let Some(extra) = top.keys().next() {
            return Err(StoreError::InvalidSelector(format!(
                "unsupported top-level key {extra:?}"
            )));
        }
        let Value::Object(fields) = selector else {
            return Err(StoreError::InvalidSelector(
                "\"selector\" must be an object".to_string(),
            ));
        };
        for (name, value) in &fields {
            if name.starts_with('$') {
                return Err(StoreError::InvalidSelector(format!(
                    "operator {name:?} is not supported"
                )));
            }
            if matches!(value, Value::Object(_) | Value::Array(_)) {
                return Err(StoreError::InvalidSelector(format!(
                    "field {name:?} must compare against a scalar"
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Build an equality selector from `(field, value)` pairs.
    pub fn equals<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self { fields }
    }

    /// Whether `record` satisfies every field constraint.
    ///
    /// Non-object values never match.
    pub fn matches(&self, record: &Value) -> bool {
        let Value::Object(obj) = record else {
            return false;
        };
        self.fields
            .iter()
            .all(|(name, expected)| obj.get(name) == Some(expected))
    }

    /// Render the selector as a query document.
    pub fn to_query_string(&self) -> String {
        serde_json::json!({ "selector": Value::Object(self.fields.clone()) }).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_match() {
        let sel = Selector::parse(r#"{"selector":{"objectType":"commitment","size":5}}"#).unwrap();
        assert!(sel.matches(&json!({"objectType": "commitment", "size": 5, "crop": "rice"})));
        assert!(!sel.matches(&json!({"objectType": "commitment", "size": 6})));
        assert!(!sel.matches(&json!({"size": 5})));
    }

    #[test]
    fn test_empty_selector_matches_all_objects() {
        let sel = Selector::parse(r#"{"selector":{}}"#).unwrap();
        assert!(sel.matches(&json!({"a": 1})));
        assert!(!sel.matches(&json!("buyer")));
    }

    #[test]
    fn test_rejects_operators_and_nesting() {
        for bad in [
            r#"{"selector":{"size":{"$gt":1}}}"#,
            r#"{"selector":{"$or":[{"a":1}]}}"#,
            r#"{"selector":{"a":[1]}}"#,
            r#"{"selector":{"a":1},"sort":["a"]}"#,
            r#"{"fields":["a"]}"#,
            r#"["selector"]"#,
            "not json",
        ] {
            assert!(
                matches!(Selector::parse(bad), Err(StoreError::InvalidSelector(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_equals_round_trips_through_parse() {
        let sel = Selector::equals([("objectType", "commitment"), ("owner", "x509::CN=a")]);
        let reparsed = Selector::parse(&sel.to_query_string()).unwrap();
        assert_eq!(sel, reparsed);
    }
}
