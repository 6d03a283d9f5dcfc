//! Canonical JSON serialization.
//!
//! Every hash, signature and comparison in the container system is computed
//! over the output of [`canonicalize`]. The contract: UTF-8, lexicographically
//! sorted object keys, literal (unescaped) non-ASCII, and no insignificant
//! whitespace.
//!
//! `serde_json::Map` is backed by a `BTreeMap` as long as the `preserve_order`
//! cargo feature is not enabled anywhere in the dependency graph (it isn't,
//! here) — so parsing into a `Value` and re-serializing compactly already
//! gives us sorted keys and literal UTF-8 for free. The only thing this
//! module adds on top is the "used" list normalization required by §4.1 of
//! the container data model: activity `used` lists are unordered and must
//! serialize identically regardless of the order they were built in.

use provtool_core::ProvtoolError;
use serde_json::Value;

pub type Result<T> = std::result::Result<T, ProvtoolError>;

/// Serialize a JSON value to its canonical byte form.
pub fn canonicalize(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(ProvtoolError::from)
}

/// Serialize a JSON value to its canonical string form.
pub fn canonicalize_string(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(ProvtoolError::from)
}

/// Parse bytes, then immediately re-emit them in canonical form. Used to
/// normalize documents that may have arrived with insignificant whitespace
/// or non-sorted keys (e.g. read back from disk or over the network).
pub fn recanonicalize(bytes: &[u8]) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_slice(bytes)?;
    canonicalize(&value)
}

/// Sort a string array field of an object in place, deduplicating is
/// deliberately *not* done here: duplicates are a caller concern, ordering
/// is the only thing canonicalization must fix.
pub fn sort_string_array_field(value: &mut Value, field: &str) {
    if let Some(Value::Array(arr)) = value.get_mut(field) {
        arr.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
    }
}

/// Concatenate a string array field, after sorting, into one deterministic
/// string. Used by the comparator to collapse an activity's `used` entity
/// list into a single comparable token (§4.6).
pub fn sorted_concat(values: &[String]) -> String {
    let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_serialize_in_sorted_order() {
        let v = json!({"zeta": 1, "alpha": 2, "mid": 3});
        let s = canonicalize_string(&v).unwrap();
        assert_eq!(s, r#"{"alpha":2,"mid":3,"zeta":1}"#);
    }

    #[test]
    fn non_ascii_is_preserved_literally() {
        let v = json!({"prov:label": "café.txt"});
        let s = canonicalize_string(&v).unwrap();
        assert!(s.contains("café.txt"));
        assert!(!s.contains("\\u"));
    }

    #[test]
    fn no_insignificant_whitespace() {
        let v = json!({"a": [1, 2, 3], "b": {"c": 4}});
        let s = canonicalize_string(&v).unwrap();
        assert!(!s.contains(' '));
        assert!(!s.contains('\n'));
    }

    #[test]
    fn permuted_used_list_concatenates_identically() {
        let a = sorted_concat(&["1".into(), "2".into(), "3".into()]);
        let b = sorted_concat(&["3".into(), "2".into(), "1".into()]);
        assert_eq!(a, b);
    }
}
