//! User reconciliation across deployments.
//!
//! Users are paired by email.  Missing ones can be invited through the API
//! (copying role and account access list) or handled manually; either way
//! they must exist before communication settings are migrated, or their
//! notification subscriptions are lost.

use std::collections::HashMap;

use conformity_api::models::User;
use serde_json::Value;
use tracing::{info, warn};

use crate::categories::MigrationContext;
use crate::error::MigrationResult;
use crate::reconcile::missing_from_target;

/// Ensure every source user has a counterpart on the target.  Returns the
/// refreshed target user list so recipient resolution sees the invitees.
pub async fn sync_users(
    ctx: &MigrationContext<'_>,
    source_users: &[User],
    target_users: &[User],
) -> MigrationResult<Vec<User>> {
    let missing = missing_from_target(source_users, target_users);
    if missing.is_empty() {
        return Ok(target_users.to_vec());
    }

    info!("Users missing from the target organisation:");
    for user in &missing {
        info!(
            "  {} {}; Email={}, Role={}",
            user.first_name, user.last_name, user.email, user.role
        );
    }

    if ctx
        .prompter
        .confirm("Invite the missing users into the target organisation now?")
    {
        invite_users(ctx, &missing).await?;
    } else {
        ctx.prompter.acknowledge(
            "Invite the listed users to the target organisation manually. \
             They must exist before communication settings are migrated.",
        );
    }

    ctx.target.get_all_users().await.map_err(Into::into)
}

async fn invite_users(ctx: &MigrationContext<'_>, missing: &[User]) -> MigrationResult<()> {
    // Invitations need the raw resource for the account access list.
    let raw_users = ctx.source.list_all_users().await?;
    let by_id: HashMap<&str, &Value> = raw_users
        .iter()
        .filter_map(|u| u.get("id").and_then(Value::as_str).map(|id| (id, u)))
        .collect();

    for user in missing {
        match by_id.get(user.user_id.as_str()) {
            Some(resource) => {
                info!(email = %user.email, "Inviting user");
                ctx.target.invite_user(resource).await?;
            }
            None => warn!(email = %user.email, "Source user resource vanished, skipping invite"),
        }
    }
    Ok(())
}
