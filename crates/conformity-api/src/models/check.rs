//! Rule checks (findings) against an account's resources.

use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::identity::IdentityKey;
use crate::models::Note;

/// A single check result.  Identity is rule-id + region + resource-name +
/// resource; check IDs embed the account ID so they never transfer across
/// deployments.
#[derive(Debug, Clone)]
pub struct Check {
    pub check_id: String,
    pub rule_id: String,
    pub region: String,
    pub resource_name: String,
    pub resource: String,
    pub message: String,
    pub suppressed: Option<bool>,
    /// Expiry of the suppression in milliseconds since epoch; `None` means
    /// suppressed indefinitely.
    pub suppressed_until: Option<i64>,
    pub notes: Vec<Note>,
}

impl Check {
    pub fn from_resource(resource: &Value) -> ModelResult<Self> {
        let attrib = resource
            .get("attributes")
            .ok_or(ModelError::missing("check", "attributes"))?;
        let rule_id = resource
            .pointer("/relationships/rule/data/id")
            .and_then(Value::as_str)
            .ok_or(ModelError::missing("check", "relationships.rule"))?;
        let notes = attrib
            .get("notes")
            .and_then(Value::as_array)
            .map(|ns| ns.iter().filter_map(Note::from_value).collect())
            .unwrap_or_default();
        Ok(Self {
            check_id: resource
                .get("id")
                .and_then(Value::as_str)
                .ok_or(ModelError::missing("check", "id"))?
                .to_string(),
            rule_id: rule_id.to_string(),
            region: attrib
                .get("region")
                .and_then(Value::as_str)
                .ok_or(ModelError::missing("check", "region"))?
                .to_string(),
            resource_name: attrib
                .get("resourceName")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            resource: attrib
                .get("resource")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            message: attrib
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            suppressed: attrib.get("suppressed").and_then(Value::as_bool),
            suppressed_until: attrib.get("suppressed-until").and_then(Value::as_i64),
            notes,
        })
    }
}

impl IdentityKey for Check {
    fn identity_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.rule_id, self.region, self.resource_name, self.resource
        )
    }
}

impl PartialEq for Check {
    fn eq(&self, other: &Self) -> bool {
        self.rule_id == other.rule_id
            && self.region == other.region
            && self.resource_name == other.resource_name
            && self.resource == other.resource
    }
}

impl Eq for Check {}

impl Hash for Check {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}
