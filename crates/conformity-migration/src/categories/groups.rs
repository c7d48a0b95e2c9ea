//! Group migration: managed (cloud-backed) and user-defined groups.

use conformity_api::models::group::{GROUP_TYPE_MANAGED, GROUP_TYPE_USER_DEFINED};
use conformity_api::models::Group;
use serde_json::Value;
use tracing::{debug, info};

use crate::categories::MigrationContext;
use crate::error::{MigrationError, MigrationResult};
use crate::reconcile::missing_from_target;

/// Re-create missing managed groups on the target.  Azure directories need
/// the app-registration key, which only the operator can supply; AWS managed
/// groups materialize when their accounts are added and need nothing here.
pub async fn migrate_managed_groups(ctx: &MigrationContext<'_>) -> MigrationResult<()> {
    let source_groups = ctx.source.list_groups(&[GROUP_TYPE_MANAGED]).await?;
    let target_groups = ctx.target.list_groups(&[GROUP_TYPE_MANAGED]).await?;

    for group in missing_from_target(&source_groups, &target_groups) {
        if group.cloud_type.as_deref() != Some("azure") {
            continue;
        }
        create_azure_directory(ctx, &group).await?;
    }
    Ok(())
}

async fn create_azure_directory(ctx: &MigrationContext<'_>, group: &Group) -> MigrationResult<()> {
    let azure = group
        .cloud_data
        .as_ref()
        .and_then(|d| d.get("azure"))
        .ok_or_else(|| {
            MigrationError::MissingData(format!("managed group '{}' has no Azure data", group.name))
        })?;
    let directory_id = azure
        .get("directoryId")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            MigrationError::MissingData(format!(
                "managed group '{}' has no Azure directory id",
                group.name
            ))
        })?;
    let app_client_id = azure
        .get("applicationId")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            MigrationError::MissingData(format!(
                "managed group '{}' has no Azure application id",
                group.name
            ))
        })?;

    let app_client_key = ctx.prompter.secret(&format!(
        "Enter the app registration key for Active Directory '{}' \
         (tenant {directory_id}, application {app_client_id}). \
         If the key is lost, generate a new client secret on the Azure app registration",
        group.name
    ));

    info!(directory = %group.name, "Creating Azure directory on target");
    ctx.target
        .create_azure_directory(&group.name, directory_id, app_client_id, &app_client_key)
        .await?;
    Ok(())
}

/// Create user-defined groups missing from the target.  Existing groups
/// (same name and tags) are left alone.
pub async fn migrate_user_defined_groups(ctx: &MigrationContext<'_>) -> MigrationResult<()> {
    info!("Creating user-defined groups");
    let source_groups = ctx.source.list_groups(&[GROUP_TYPE_USER_DEFINED]).await?;
    let target_groups = ctx.target.list_groups(&[GROUP_TYPE_USER_DEFINED]).await?;

    if source_groups.is_empty() {
        info!("No user-defined group found");
        return Ok(());
    }

    let missing = missing_from_target(&source_groups, &target_groups);
    for group in &source_groups {
        if missing.iter().any(|m| m.group_id == group.group_id) {
            info!(group = %group.name, tags = ?group.tags, "Creating group");
            ctx.target.create_group(&group.name, &group.tags).await?;
        } else {
            debug!(group = %group.name, "Group already exists, skipping");
        }
    }
    Ok(())
}
