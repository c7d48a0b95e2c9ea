//! JSON:API envelope helpers.
//!
//! Both deployments speak the same JSON:API-flavored wire format: collection
//! endpoints return `{"data": [...], "meta": {"total": N}}` and mutation
//! endpoints accept `{"data": {"attributes": {...}}}`.

use serde::Deserialize;
use serde_json::{json, Value};

/// A collection response with its pagination meta.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDocument {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub meta: Meta,
}

/// Collection-level metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    /// Total number of items across all pages.
    #[serde(default)]
    pub total: u64,
}

/// Wrap attributes into the `{"data": {"attributes": ...}}` mutation envelope.
#[must_use]
pub fn attributes_envelope(attributes: Value) -> Value {
    json!({ "data": { "attributes": attributes } })
}

/// Pull `data` out of a response document, if present.
#[must_use]
pub fn data_of(document: &Value) -> Option<&Value> {
    document.get("data")
}

/// Pull `data` as a resource array; a single resource object yields a
/// one-element slice view via cloning.
#[must_use]
pub fn data_array(document: &Value) -> Vec<Value> {
    match document.get("data") {
        Some(Value::Array(items)) => items.clone(),
        Some(other) if !other.is_null() => vec![other.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_document_parses_meta_total() {
        let doc: CollectionDocument =
            serde_json::from_value(json!({ "data": [{}, {}], "meta": { "total": 250 } })).unwrap();
        assert_eq!(doc.data.len(), 2);
        assert_eq!(doc.meta.total, 250);
    }

    #[test]
    fn test_collection_document_defaults() {
        let doc: CollectionDocument = serde_json::from_value(json!({})).unwrap();
        assert!(doc.data.is_empty());
        assert_eq!(doc.meta.total, 0);
    }

    #[test]
    fn test_attributes_envelope_shape() {
        let env = attributes_envelope(json!({ "name": "x" }));
        assert_eq!(env["data"]["attributes"]["name"], "x");
    }

    #[test]
    fn test_data_array_single_object() {
        let doc = json!({ "data": { "id": "1" } });
        assert_eq!(data_array(&doc).len(), 1);
    }
}
