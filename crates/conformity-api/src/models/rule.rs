//! Per-account rule settings.

use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::identity::IdentityKey;
use crate::models::Note;

/// One rule's configuration on an account, as returned by the
/// rule-settings endpoint, together with its note history when requested.
#[derive(Debug, Clone)]
pub struct Rule {
    /// The raw setting payload, re-sent verbatim to the target.
    pub setting: Value,
    pub rule_id: String,
    pub enabled: bool,
    pub configured: bool,
    pub notes: Vec<Note>,
}

impl Rule {
    pub fn new(setting: Value, notes: Vec<Note>) -> ModelResult<Self> {
        let rule_id = setting
            .get("id")
            .and_then(Value::as_str)
            .ok_or(ModelError::missing("rule setting", "id"))?
            .to_string();
        let enabled = setting
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let configured = setting
            .get("configured")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(Self {
            setting,
            rule_id,
            enabled,
            configured,
            notes,
        })
    }
}

impl IdentityKey for Rule {
    fn identity_key(&self) -> String {
        self.rule_id.clone()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.rule_id == other.rule_id
    }
}

impl Eq for Rule {}

impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rule_id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_fields_from_setting() {
        let r = Rule::new(
            json!({ "id": "EC2-001", "enabled": true, "configured": true, "extraSettings": [] }),
            vec![],
        )
        .unwrap();
        assert_eq!(r.rule_id, "EC2-001");
        assert!(r.enabled);
        assert!(r.configured);
    }

    #[test]
    fn test_setting_without_id_is_rejected() {
        assert!(Rule::new(json!({ "enabled": true }), vec![]).is_err());
    }
}
