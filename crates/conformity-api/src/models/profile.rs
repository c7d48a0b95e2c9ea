//! Profiles: named bundles of rule settings, shipped around as a full
//! JSON:API document with the rule settings in `included`.

use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::canonical::canonical_string;
use crate::error::{ModelError, ModelResult};
use crate::identity::IdentityKey;

#[derive(Debug, Clone)]
pub struct Profile {
    /// The whole profile document (`data` + `included`), kept verbatim
    /// so it can be re-posted to the target organisation.
    pub settings: Value,
}

impl Profile {
    pub fn new(settings: Value) -> ModelResult<Self> {
        if settings.pointer("/data/attributes/name").is_none() {
            return Err(ModelError::missing("profile", "data.attributes.name"));
        }
        Ok(Self { settings })
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.settings.pointer("/data/id").and_then(Value::as_str)
    }

    pub fn name(&self) -> &str {
        self.settings
            .pointer("/data/attributes/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.settings
            .pointer("/data/attributes/description")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn included_rules(&self) -> &[Value] {
        self.settings
            .get("included")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The document with system-assigned identifiers removed, suitable
    /// both for posting to another organisation and for change
    /// detection between the two copies.
    pub fn portable_document(&self) -> Value {
        let mut doc = self.settings.clone();
        if let Some(data) = doc.get_mut("data").and_then(Value::as_object_mut) {
            data.remove("id");
            data.remove("relationships");
        }
        doc.as_object_mut().map(|d| d.remove("meta"));
        if let Some(included) = doc.get_mut("included").and_then(Value::as_array_mut) {
            for entry in included {
                if let Some(entry) = entry.as_object_mut() {
                    entry.remove("id");
                    entry.remove("relationships");
                }
            }
        }
        doc
    }
}

impl IdentityKey for Profile {
    fn identity_key(&self) -> String {
        self.name().to_string()
    }

    fn content_key(&self) -> String {
        canonical_string(&self.portable_document())
    }
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Profile {}

impl Hash for Profile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}
