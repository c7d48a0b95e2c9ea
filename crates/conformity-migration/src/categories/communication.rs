//! Communication-channel settings migration.
//!
//! Settings are append-only: a setting already present on the target (same
//! channel, filter and configuration) is left alone, and target-only
//! settings are never deleted.  Recipient lists are re-resolved through
//! email before comparison, so two settings that differ only in system-local
//! user ids still count as equivalent.

use conformity_api::models::CommunicationSetting;
use conformity_api::IdentityKey;
use tracing::{debug, info};

use crate::categories::MigrationContext;
use crate::error::MigrationResult;
use crate::recipients::RecipientResolver;

/// Copy the settings scoped to one account, or the organisation-level
/// settings when the account ids are `None`.
pub async fn migrate_communication_settings(
    ctx: &MigrationContext<'_>,
    resolver: &RecipientResolver,
    source_acct_id: Option<&str>,
    target_acct_id: Option<&str>,
    target_org_id: &str,
) -> MigrationResult<()> {
    let source_settings = ctx.source.get_communication_settings(source_acct_id).await?;

    // Convert recipients, dropping duplicates the conversion may introduce.
    let mut seen = std::collections::HashSet::new();
    let candidates: Vec<CommunicationSetting> = source_settings
        .iter()
        .map(|s| resolver.convert_setting(s))
        .filter(|s| seen.insert(s.identity_key()))
        .collect();

    let target_settings = ctx.target.get_communication_settings(target_acct_id).await?;
    let new_settings = crate::reconcile::missing_from_target(&candidates, &target_settings);

    if new_settings.is_empty() {
        debug!("All communication settings already present");
        return Ok(());
    }

    info!(
        count = new_settings.len(),
        "Creating communication settings on target"
    );
    ctx.target
        .create_communication_settings(&new_settings, target_acct_id, target_org_id)
        .await?;
    Ok(())
}
