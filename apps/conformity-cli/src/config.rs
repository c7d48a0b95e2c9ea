//! YAML configuration for both Conformity deployments.
//!
//! The file is created by `conformity-migrate configure` and read by the
//! migrate command.  Endpoint URLs are derived from the region so operators
//! only ever enter a region and an API key.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Regions a legacy Conformity deployment can live in.
pub const LEGACY_REGIONS: &[&str] = &["eu-west-1", "ap-southeast-2", "us-west-2"];

/// Regions a Cloud One Conformity deployment can live in.
pub const CLOUD_ONE_REGIONS: &[&str] = &[
    "us-1", "in-1", "gb-1", "jp-1", "de-1", "au-1", "ca-1", "sg-1",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub legacy: EndpointConfig,
    pub cloud_one: EndpointConfig,
    #[serde(default)]
    pub migration: MigrationTuning,
}

/// One deployment: where it is and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub region: String,
    pub api_key: String,
    /// Overrides the JSON:API content type for deployments whose gateway
    /// only accepts `application/json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Knobs for transport resilience and migration pacing, all optional in
/// the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationTuning {
    /// Retry attempts for transient API failures.
    pub max_retry_attempts: u32,
    /// Base for the exponential backoff between retries, in seconds.
    pub backoff_base_secs: u64,
    /// HTTP statuses treated as transient.
    pub retryable_statuses: Vec<u16>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// How often to poll for bot-scan completion, in seconds.
    pub bot_scan_interval_secs: u64,
    /// Maximum length of a note copied onto a suppressed check.
    pub note_truncation_len: usize,
}

impl Default for MigrationTuning {
    fn default() -> Self {
        Self {
            max_retry_attempts: 9,
            backoff_base_secs: 1,
            retryable_statuses: vec![429, 500, 501, 502, 503, 504],
            connect_timeout_secs: 10,
            read_timeout_secs: 300,
            bot_scan_interval_secs: 10,
            note_truncation_len: 200,
        }
    }
}

impl AppConfig {
    /// Load the configuration, failing with a pointer to `configure` when
    /// the file does not exist yet.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_yaml::to_string(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Base URL of the legacy deployment's public API.
    #[must_use]
    pub fn legacy_base_url(&self) -> String {
        format!("https://{}-api.cloudconformity.com/v1", self.legacy.region)
    }

    /// Base URL of the Cloud One deployment's Conformity API.
    #[must_use]
    pub fn cloud_one_base_url(&self) -> String {
        format!(
            "https://conformity.{}.cloudone.trendmicro.com/api",
            self.cloud_one.region
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_round_trips() {
        let yaml = "\
legacy:
  region: eu-west-1
  api_key: legacy-key
cloud_one:
  region: us-1
  api_key: c1-key
  content_type: application/json
migration:
  max_retry_attempts: 3
  bot_scan_interval_secs: 2
";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.legacy.api_key, "legacy-key");
        assert_eq!(config.legacy.content_type, None);
        assert_eq!(
            config.cloud_one.content_type.as_deref(),
            Some("application/json")
        );
        assert_eq!(config.migration.max_retry_attempts, 3);
        assert_eq!(config.migration.bot_scan_interval_secs, 2);
        // Unspecified tuning fields fall back to defaults.
        assert_eq!(config.migration.note_truncation_len, 200);
        assert_eq!(config.migration.retryable_statuses.len(), 6);
    }

    #[test]
    fn test_tuning_section_is_optional() {
        let yaml = "\
legacy:
  region: ap-southeast-2
  api_key: a
cloud_one:
  region: de-1
  api_key: b
";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.migration.max_retry_attempts, 9);
        assert_eq!(
            config.legacy_base_url(),
            "https://ap-southeast-2-api.cloudconformity.com/v1"
        );
        assert_eq!(
            config.cloud_one_base_url(),
            "https://conformity.de-1.cloudone.trendmicro.com/api"
        );
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        let err = serde_yaml::from_str::<AppConfig>("legacy: [not, a, map]");
        assert!(err.is_err());
    }
}
