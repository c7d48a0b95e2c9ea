//! Scheduled report configurations.

use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::canonical::canonical_string;
use crate::error::{ModelError, ModelResult};
use crate::identity::IdentityKey;

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub report_config_id: String,
    pub title: String,
    /// The `configuration` attribute, re-sent verbatim when copying.
    pub configuration: Value,
}

impl ReportConfig {
    pub fn from_resource(resource: &Value) -> ModelResult<Self> {
        let report_config_id = resource
            .get("id")
            .and_then(Value::as_str)
            .ok_or(ModelError::missing("report config", "id"))?
            .to_string();
        let configuration = resource
            .pointer("/attributes/configuration")
            .cloned()
            .ok_or(ModelError::missing("report config", "configuration"))?;
        let title = configuration
            .get("title")
            .and_then(Value::as_str)
            .ok_or(ModelError::missing("report config", "configuration.title"))?
            .to_string();
        Ok(Self {
            report_config_id,
            title,
            configuration,
        })
    }
}

impl IdentityKey for ReportConfig {
    fn identity_key(&self) -> String {
        self.title.clone()
    }

    fn content_key(&self) -> String {
        canonical_string(&self.configuration)
    }
}

impl PartialEq for ReportConfig {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for ReportConfig {}

impl Hash for ReportConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_comes_from_configuration() {
        let rc = ReportConfig::from_resource(&json!({
            "id": "rc-1",
            "attributes": { "configuration": { "title": "Weekly", "scheduled": true } }
        }))
        .unwrap();
        assert_eq!(rc.title, "Weekly");
        assert_eq!(rc.identity_key(), "Weekly");
    }

    #[test]
    fn test_content_key_differs_when_schedule_changes() {
        let mk = |scheduled: bool| {
            ReportConfig::from_resource(&json!({
                "id": "rc-1",
                "attributes": { "configuration": { "title": "Weekly", "scheduled": scheduled } }
            }))
            .unwrap()
        };
        let a = mk(true);
        let b = mk(false);
        assert_eq!(a, b);
        assert_ne!(a.content_key(), b.content_key());
    }

    #[test]
    fn test_missing_configuration_is_rejected() {
        assert!(ReportConfig::from_resource(&json!({ "id": "rc-1", "attributes": {} })).is_err());
    }
}
