//! Report-config migration at organisation, group and account scope.

use std::collections::HashMap;

use conformity_api::models::ReportConfig;
use conformity_api::IdentityKey;
use tracing::{info, warn};

use crate::categories::MigrationContext;
use crate::error::MigrationResult;
use crate::reconcile::reconcile;

/// The scope a report config belongs to, with the ids on both sides.
#[derive(Debug, Clone, Copy)]
pub enum ReportScope<'a> {
    Organisation,
    Group {
        source_group_id: &'a str,
        target_group_id: &'a str,
    },
    Account {
        source_acct_id: &'a str,
        target_acct_id: &'a str,
    },
}

impl ReportScope<'_> {
    fn label(&self) -> &'static str {
        match self {
            Self::Organisation => "organisation",
            Self::Group { .. } => "group",
            Self::Account { .. } => "account",
        }
    }
}

/// Copy report configs within one scope.  Title collisions are replaced
/// (delete first) behind a confirmation gate; unchanged ones are skipped.
pub async fn migrate_report_configs(
    ctx: &MigrationContext<'_>,
    scope: ReportScope<'_>,
) -> MigrationResult<()> {
    info!(scope = scope.label(), "Copying report configs");

    let (source_configs, target_configs) = match scope {
        ReportScope::Organisation => (
            ctx.source.list_organisation_report_configs().await?,
            ctx.target.list_organisation_report_configs().await?,
        ),
        ReportScope::Group {
            source_group_id,
            target_group_id,
        } => (
            ctx.source.list_group_report_configs(source_group_id).await?,
            ctx.target.list_group_report_configs(target_group_id).await?,
        ),
        ReportScope::Account {
            source_acct_id,
            target_acct_id,
        } => (
            ctx.source.list_account_report_configs(source_acct_id).await?,
            ctx.target.list_account_report_configs(target_acct_id).await?,
        ),
    };

    let outcome = reconcile(&source_configs, &target_configs);
    if outcome.is_noop() {
        return Ok(());
    }

    if !outcome.to_replace.is_empty() {
        let titles: Vec<&str> = outcome
            .to_replace
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        let message = format!(
            "These {} report configs on the target will be replaced during migration: {}. Continue?",
            scope.label(),
            titles.join(", ")
        );
        if !ctx.prompter.confirm_sure(&message) {
            info!(scope = scope.label(), "Report config migration skipped");
            return Ok(());
        }
        for config in &outcome.to_replace {
            info!(title = %config.title, "Deleting target report config");
            ctx.target
                .delete_report_config(&config.report_config_id)
                .await?;
        }
    }

    for config in &outcome.to_create {
        info!(title = %config.title, "Creating report config");
        create_in_scope(ctx, config, scope).await?;
    }

    Ok(())
}

async fn create_in_scope(
    ctx: &MigrationContext<'_>,
    config: &ReportConfig,
    scope: ReportScope<'_>,
) -> MigrationResult<()> {
    match scope {
        ReportScope::Organisation => {
            ctx.target
                .create_organisation_report_config(&config.configuration)
                .await?;
        }
        ReportScope::Group {
            target_group_id, ..
        } => {
            ctx.target
                .create_group_report_config(&config.configuration, target_group_id)
                .await?;
        }
        ReportScope::Account { target_acct_id, .. } => {
            ctx.target
                .create_account_report_config(&config.configuration, target_acct_id)
                .await?;
        }
    }
    Ok(())
}

/// Walk every source group, pair it with its target counterpart by name and
/// tags, and copy its report configs.  Groups with no counterpart are
/// reported and skipped; a failure in one group does not stop the others.
pub async fn migrate_group_report_configs(ctx: &MigrationContext<'_>) -> MigrationResult<()> {
    let source_groups = ctx.source.list_groups(&[]).await?;
    let target_groups = ctx.target.list_groups(&[]).await?;
    let target_by_identity: HashMap<String, &str> = target_groups
        .iter()
        .map(|g| (g.identity_key(), g.group_id.as_str()))
        .collect();

    for group in &source_groups {
        info!(group = %group.name, tags = ?group.tags, "Migrating group report configs");
        let Some(target_group_id) = target_by_identity.get(&group.identity_key()).copied() else {
            warn!(
                group = %group.name,
                tags = ?group.tags,
                "No matching target group, cannot migrate its report configs"
            );
            continue;
        };
        let scope = ReportScope::Group {
            source_group_id: &group.group_id,
            target_group_id,
        };
        if let Err(error) = migrate_report_configs(ctx, scope).await {
            warn!(group = %group.name, error = %error, "Group report config migration failed");
        }
    }
    Ok(())
}
