//! Category migrators.
//!
//! One module per configuration category.  Each migrator takes the shared
//! [`MigrationContext`] and owns its confirmation gates; the orchestrator
//! decides ordering and isolates failures between categories.

use std::time::Duration;

use conformity_client::ConformityClient;

use crate::confirm::Prompter;

pub mod accounts;
pub mod checks;
pub mod communication;
pub mod groups;
pub mod profiles;
pub mod report_configs;
pub mod users;

/// Tunables that apply across categories.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    /// How often to re-check a running bot scan.
    pub bot_scan_interval: Duration,
    /// Maximum length for a note attached to a suppressed check.
    pub note_truncation_len: usize,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            bot_scan_interval: Duration::from_secs(10),
            note_truncation_len: 200,
        }
    }
}

/// Everything a category migrator needs: both deployments, the operator
/// prompt seam and the shared tunables.
pub struct MigrationContext<'a> {
    pub source: &'a ConformityClient,
    pub target: &'a ConformityClient,
    pub prompter: &'a dyn Prompter,
    pub settings: &'a MigrationSettings,
}
