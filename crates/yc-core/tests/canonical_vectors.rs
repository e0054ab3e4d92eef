//! # Canonical Encoding Vectors
//!
//! Fixed input/output pairs for the encoding buyers must reproduce when
//! proposing an agreement. Client SDKs in other languages are checked
//! against the same table; a change here breaks every existing proposal.

use yc_core::canonical::CanonicalBytes;
use yc_core::digest::{sha256_digest, sha256_stored};

/// (JSON input, expected canonical bytes)
const TEST_VECTORS: &[(&str, &str)] = &[
    (r#"{"commitmentID":"C1","rate":100}"#, r#"{"commitmentID":"C1","rate":100}"#),
    (r#"{"rate":100,"commitmentID":"C1"}"#, r#"{"commitmentID":"C1","rate":100}"#),
    (
        r#"{ "rate" : 250 , "commitmentID" : "plot-7" }"#,
        r#"{"commitmentID":"plot-7","rate":250}"#,
    ),
    (
        r#"{"owner":"x509::CN=a","size":12,"objectType":"commitment","crop":"maize","location":"field-3","commitmentID":"C9"}"#,
        r#"{"commitmentID":"C9","crop":"maize","location":"field-3","objectType":"commitment","owner":"x509::CN=a","size":12}"#,
    ),
    (r#"{}"#, r#"{}"#),
];

#[test]
fn canonical_bytes_match_expected_vectors() {
    for (input, expected) in TEST_VECTORS {
        let value: serde_json::Value = serde_json::from_str(input).unwrap();
        let cb = CanonicalBytes::new(&value).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            *expected,
            "canonical mismatch for input: {input}"
        );
    }
}

#[test]
fn digest_of_canonical_equals_digest_of_stored_expected_bytes() {
    for (input, expected) in TEST_VECTORS {
        let value: serde_json::Value = serde_json::from_str(input).unwrap();
        let cb = CanonicalBytes::new(&value).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_stored(expected.as_bytes()));
    }
}

#[test]
fn non_canonical_input_digest_differs_from_canonical() {
    let raw = br#"{"rate":100,"commitmentID":"C1"}"#;
    let value: serde_json::Value = serde_json::from_slice(raw).unwrap();
    let cb = CanonicalBytes::new(&value).unwrap();
    assert_ne!(sha256_stored(raw), sha256_digest(&cb));
}
