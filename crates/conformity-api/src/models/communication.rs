//! Communication channel settings (email, SMS, Slack, webhooks, ...).

use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::canonical::canonical_string;
use crate::identity::IdentityKey;

/// One notification channel configuration.
///
/// Identity is the deep structural content of `{channel, filter,
/// configuration}`.  Nested object key order never matters; array order does.
/// An absent `filter` normalizes to JSON `null` and is *not* equal to an
/// empty `{}` filter; the two produce different behavior on the remote side,
/// so they are different settings.
#[derive(Debug, Clone)]
pub struct CommunicationSetting {
    pub channel: String,
    pub enabled: bool,
    pub filter: Option<Value>,
    pub configuration: Option<Value>,
}

impl CommunicationSetting {
    pub fn from_resource(resource: &Value) -> Option<Self> {
        let attrib = resource.get("attributes")?;
        Some(Self {
            channel: attrib.get("channel")?.as_str()?.to_string(),
            enabled: attrib.get("enabled").and_then(Value::as_bool).unwrap_or(false),
            filter: attrib.get("filter").filter(|v| !v.is_null()).cloned(),
            configuration: attrib
                .get("configuration")
                .filter(|v| !v.is_null())
                .cloned(),
        })
    }

    fn identity_value(&self) -> Value {
        serde_json::json!({
            "channel": self.channel,
            "filter": self.filter.clone().unwrap_or(Value::Null),
            "configuration": self.configuration.clone().unwrap_or(Value::Null),
        })
    }
}

impl IdentityKey for CommunicationSetting {
    fn identity_key(&self) -> String {
        canonical_string(&self.identity_value())
    }
}

impl PartialEq for CommunicationSetting {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for CommunicationSetting {}

impl Hash for CommunicationSetting {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn setting(channel: &str, filter: Option<Value>, configuration: Value) -> CommunicationSetting {
        CommunicationSetting {
            channel: channel.to_string(),
            enabled: true,
            filter,
            configuration: Some(configuration),
        }
    }

    #[test]
    fn test_filter_key_order_is_irrelevant() {
        let a = setting(
            "email",
            Some(serde_json::from_str(r#"{"regions": ["us-east-1"], "risk": "HIGH"}"#).unwrap()),
            json!({ "users": ["u-1"] }),
        );
        let b = setting(
            "email",
            Some(serde_json::from_str(r#"{"risk": "HIGH", "regions": ["us-east-1"]}"#).unwrap()),
            json!({ "users": ["u-1"] }),
        );
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_recipient_order_is_significant() {
        let a = setting("email", None, json!({ "users": ["u-1", "u-2"] }));
        let b = setting("email", None, json!({ "users": ["u-2", "u-1"] }));
        assert_ne!(a, b);
    }

    #[test]
    fn test_absent_filter_differs_from_empty_filter() {
        let absent = setting("slack", None, json!({ "url": "https://x" }));
        let empty = setting("slack", Some(json!({})), json!({ "url": "https://x" }));
        assert_ne!(absent, empty);
        assert_ne!(empty, absent);
    }

    #[test]
    fn test_enabled_flag_is_not_part_of_identity() {
        let mut a = setting("email", None, json!({ "users": [] }));
        let b = a.clone();
        a.enabled = false;
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_treats_null_filter_as_absent() {
        let s = CommunicationSetting::from_resource(&json!({
            "attributes": {
                "channel": "email",
                "enabled": true,
                "filter": null,
                "configuration": { "users": [] },
            }
        }))
        .unwrap();
        assert!(s.filter.is_none());
    }
}
