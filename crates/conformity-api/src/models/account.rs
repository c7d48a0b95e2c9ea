//! Cloud accounts registered with an organisation.

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::identity::IdentityKey;

/// Summary view of an account as returned by the accounts collection.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: String,
    pub name: String,
    pub environment: String,
    pub cloud_type: String,
    pub managed_group_id: Option<String>,
    /// Raw attributes; provider-specific identifiers live here.
    pub attributes: Value,
}

impl Account {
    pub fn from_resource(resource: &Value) -> ModelResult<Self> {
        let account_id = resource
            .get("id")
            .and_then(Value::as_str)
            .ok_or(ModelError::missing("account", "id"))?
            .to_string();
        let attributes = resource.get("attributes").cloned().unwrap_or(Value::Null);
        let name = attributes
            .get("name")
            .and_then(Value::as_str)
            .ok_or(ModelError::missing("account", "name"))?
            .to_string();
        let environment = attributes
            .get("environment")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let cloud_type = attributes
            .get("cloud-type")
            .and_then(Value::as_str)
            .unwrap_or("aws")
            .to_string();
        let managed_group_id = attributes
            .get("managed-group-id")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            account_id,
            name,
            environment,
            cloud_type,
            managed_group_id,
            attributes,
        })
    }

    /// The provider-side identifier used to pair accounts across
    /// organisations: AWS account number or Azure subscription id.
    pub fn provider_identity(&self) -> Option<String> {
        match self.cloud_type.as_str() {
            "aws" => self
                .attributes
                .get("awsaccount-id")
                .and_then(Value::as_str)
                .map(str::to_string),
            "azure" => self
                .attributes
                .pointer("/cloud-data/azure/subscriptionId")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

impl IdentityKey for Account {
    fn identity_key(&self) -> String {
        self.provider_identity()
            .unwrap_or_else(|| format!("{}|{}", self.name, self.environment))
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for Account {}

/// One rule's enablement flags from the account-details rules relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    pub id: String,
    pub enabled: bool,
    pub configured: bool,
}

impl RuleSummary {
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            id: value.get("id")?.as_str()?.to_string(),
            enabled: value.get("enabled").and_then(Value::as_bool).unwrap_or(false),
            configured: value
                .get("configured")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

/// Full single-account view, including tags, bot state and per-rule flags.
#[derive(Debug, Clone)]
pub struct AccountDetails {
    pub account: Account,
    pub tags: Vec<String>,
    /// `None` means no scan is in flight, i.e. the bot is idle.
    pub bot_status: Option<String>,
    /// Bot settings payload with audit-only fields stripped, ready to
    /// be written to another account.
    pub bot_settings: Value,
    pub rules: Vec<RuleSummary>,
}

impl AccountDetails {
    pub fn from_resource(resource: &Value) -> ModelResult<Self> {
        let account = Account::from_resource(resource)?;
        let attributes = resource.get("attributes").cloned().unwrap_or(Value::Null);
        let tags = attributes
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let bot_status = attributes
            .get("bot-status")
            .and_then(Value::as_str)
            .map(str::to_string);
        let mut bot_settings = attributes
            .pointer("/settings/bot")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        if let Some(obj) = bot_settings.as_object_mut() {
            obj.remove("lastModifiedFrom");
            obj.remove("lastModifiedBy");
        }
        let rules = attributes
            .pointer("/settings/rules")
            .and_then(Value::as_array)
            .map(|rules| rules.iter().filter_map(RuleSummary::from_value).collect())
            .unwrap_or_default();
        Ok(Self {
            account,
            tags,
            bot_status,
            bot_settings,
            rules,
        })
    }

    /// Rules that carry account-specific configuration worth copying.
    pub fn configured_rules(&self) -> impl Iterator<Item = &RuleSummary> {
        self.rules.iter().filter(|r| r.enabled || r.configured)
    }
}
