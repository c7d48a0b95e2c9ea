//! Organisation and custom profile migration.

use conformity_api::models::Profile;
use conformity_api::IdentityKey;
use conformity_client::ConformityClient;
use tracing::{debug, info};

use crate::categories::MigrationContext;
use crate::error::MigrationResult;
use crate::reconcile::reconcile;

/// Copy the organisation-wide profile.  The target's profile is only
/// overwritten after the operator confirms, and only when it actually
/// differs from the source.
pub async fn migrate_organisation_profile(ctx: &MigrationContext<'_>) -> MigrationResult<()> {
    info!("Copying organisation profile");
    let source_profile = ctx.source.get_organisation_profile(true).await?;
    let target_profile = ctx.target.get_organisation_profile(true).await?;

    if source_profile.content_key() == target_profile.content_key() {
        info!("Organisation profile already matches, nothing to do");
        return Ok(());
    }

    if !target_profile.included_rules().is_empty()
        && !ctx.prompter.confirm_sure(
            "The target organisation profile has configured rules in it. Do you want to overwrite it?",
        )
    {
        info!("Organisation profile left untouched");
        return Ok(());
    }

    ctx.target
        .update_organisation_profile(&source_profile)
        .await?;
    Ok(())
}

/// Copy custom profiles.  Name collisions are replaced (delete first, then
/// create) after a confirmation gate; unchanged profiles are skipped.
pub async fn migrate_custom_profiles(ctx: &MigrationContext<'_>) -> MigrationResult<()> {
    info!("Copying custom profiles");
    // The listing endpoint omits rule settings, so two profiles that
    // diverged only in their rules would look identical there.  Fetch
    // every profile in full before comparing.
    let source_profiles = fetch_full_profiles(ctx.source).await?;
    let target_profiles = fetch_full_profiles(ctx.target).await?;

    let outcome = reconcile(&source_profiles, &target_profiles);
    for profile in &outcome.already_present {
        debug!(profile = profile.name(), "Profile already present, skipping");
    }
    if outcome.is_noop() {
        return Ok(());
    }

    if !outcome.to_replace.is_empty() {
        let names: Vec<&str> = outcome.to_replace.iter().map(|p| p.name()).collect();
        let message = format!(
            "These custom profiles on the target will be replaced during migration: {}. Continue?",
            names.join(", ")
        );
        if !ctx.prompter.confirm_sure(&message) {
            info!("Custom profile migration skipped");
            return Ok(());
        }
        // All deletions happen before any creation.
        for profile in &outcome.to_replace {
            if let Some(profile_id) = profile.profile_id() {
                info!(profile = profile.name(), "Deleting target profile");
                ctx.target.delete_profile(profile_id).await?;
            }
        }
    }

    for profile in &outcome.to_create {
        info!(profile = profile.name(), "Creating profile");
        ctx.target.create_profile(profile).await?;
    }

    Ok(())
}

async fn fetch_full_profiles(client: &ConformityClient) -> MigrationResult<Vec<Profile>> {
    let mut profiles = Vec::new();
    for listed in client.get_custom_profiles().await? {
        let Some(profile_id) = listed.profile_id() else {
            continue;
        };
        profiles.push(client.get_profile(profile_id, true).await?);
    }
    Ok(profiles)
}
