//! Canonical JSON encoding for content fingerprints.
//!
//! Two JSON documents that differ only in object key insertion order must
//! produce the same fingerprint, because the remote APIs serialize nested
//! configuration maps in no particular order.  Array order is preserved:
//! where the API sends an ordered list (e.g. recipient user-ids), order is
//! part of the content.

use serde_json::Value;

/// Render a JSON value to a deterministic string: object keys are emitted in
/// sorted order at every nesting level, arrays and scalars verbatim.
///
/// The output is valid JSON, but its only consumer is equality and hashing.
#[must_use]
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Keys are re-serialized so embedded quotes stay escaped.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_is_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": {"y": 2, "x": 3}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": {"x": 3, "y": 2}, "b": 1}"#).unwrap();
        assert_eq!(canonical_string(&a), canonical_string(&b));
    }

    #[test]
    fn test_array_order_is_significant() {
        let a = json!({ "users": [1, 2] });
        let b = json!({ "users": [2, 1] });
        assert_ne!(canonical_string(&a), canonical_string(&b));
    }

    #[test]
    fn test_null_differs_from_empty_object() {
        assert_ne!(canonical_string(&Value::Null), canonical_string(&json!({})));
    }

    #[test]
    fn test_scalars_and_strings() {
        assert_eq!(canonical_string(&json!(true)), "true");
        assert_eq!(canonical_string(&json!(42)), "42");
        assert_eq!(canonical_string(&json!("a\"b")), r#""a\"b""#);
    }

    #[test]
    fn test_nested_arrays_of_objects() {
        let a = json!([{ "b": 1, "a": 2 }, { "d": 3, "c": 4 }]);
        let b = json!([{ "a": 2, "b": 1 }, { "c": 4, "d": 3 }]);
        assert_eq!(canonical_string(&a), canonical_string(&b));
    }
}
