//! Notification-recipient resolution across deployments.
//!
//! Communication settings reference users by system-local id.  Recipients
//! are re-resolved on the target through the email address: source user id
//! to email, email to target user id.  A miss at either hop is logged and
//! the recipient excluded; the setting is still migrated with the reduced
//! list.

use std::collections::HashMap;

use conformity_api::models::{CommunicationSetting, User};
use serde_json::{json, Value};
use tracing::warn;

pub struct RecipientResolver {
    source_id_to_email: HashMap<String, String>,
    target_email_to_id: HashMap<String, String>,
}

impl RecipientResolver {
    pub fn new(source_users: &[User], target_users: &[User]) -> Self {
        Self {
            source_id_to_email: source_users
                .iter()
                .map(|u| (u.user_id.clone(), u.email.clone()))
                .collect(),
            target_email_to_id: target_users
                .iter()
                .map(|u| (u.email.clone(), u.user_id.clone()))
                .collect(),
        }
    }

    /// Map source user ids to target user ids, dropping unresolvable ones.
    pub fn resolve(&self, source_user_ids: &[String]) -> Vec<String> {
        let mut target_ids = Vec::new();
        for source_id in source_user_ids {
            let Some(email) = self.source_id_to_email.get(source_id) else {
                warn!(
                    user_id = %source_id,
                    "No email found for source user, excluding from notification"
                );
                continue;
            };
            let Some(target_id) = self.target_email_to_id.get(email) else {
                warn!(
                    email = %email,
                    "No matching target user, excluding from notification"
                );
                continue;
            };
            target_ids.push(target_id.clone());
        }
        target_ids
    }

    /// Rewrite a `{"users": [...]}` channel configuration for the target.
    pub fn convert_configuration(&self, configuration: &Value) -> Value {
        let source_ids: Vec<String> = configuration
            .get("users")
            .and_then(Value::as_array)
            .map(|users| {
                users
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        json!({ "users": self.resolve(&source_ids) })
    }

    /// Rewrite one communication setting.  Only the email and sms channels
    /// carry user-id recipient lists; other channels pass through as-is.
    pub fn convert_setting(&self, setting: &CommunicationSetting) -> CommunicationSetting {
        let configuration = match (setting.channel.as_str(), &setting.configuration) {
            ("email" | "sms", Some(conf)) => Some(self.convert_configuration(conf)),
            (_, conf) => conf.clone(),
        };
        CommunicationSetting {
            channel: setting.channel.clone(),
            enabled: setting.enabled,
            filter: setting.filter.clone(),
            configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, email: &str) -> User {
        User {
            user_id: id.to_string(),
            email: email.to_string(),
            first_name: "F".to_string(),
            last_name: "L".to_string(),
            role: "USER".to_string(),
        }
    }

    fn resolver() -> RecipientResolver {
        RecipientResolver::new(
            &[user("s1", "a@example.com"), user("s2", "b@example.com")],
            &[user("t1", "a@example.com")],
        )
    }

    #[test]
    fn test_resolves_through_email() {
        let ids = resolver().resolve(&["s1".to_string()]);
        assert_eq!(ids, vec!["t1".to_string()]);
    }

    #[test]
    fn test_misses_are_excluded_not_fatal() {
        // s2's email has no target user; "s3" is unknown entirely.
        let ids = resolver().resolve(&[
            "s1".to_string(),
            "s2".to_string(),
            "s3".to_string(),
        ]);
        assert_eq!(ids, vec!["t1".to_string()]);
    }

    #[test]
    fn test_email_configuration_is_rewritten() {
        let setting = CommunicationSetting {
            channel: "email".to_string(),
            enabled: true,
            filter: None,
            configuration: Some(json!({ "users": ["s1", "s2"] })),
        };
        let converted = resolver().convert_setting(&setting);
        assert_eq!(converted.configuration, Some(json!({ "users": ["t1"] })));
    }

    #[test]
    fn test_webhook_configuration_passes_through() {
        let setting = CommunicationSetting {
            channel: "webhook".to_string(),
            enabled: true,
            filter: None,
            configuration: Some(json!({ "url": "https://example.com/hook" })),
        };
        let converted = resolver().convert_setting(&setting);
        assert_eq!(converted.configuration, setting.configuration);
    }
}
