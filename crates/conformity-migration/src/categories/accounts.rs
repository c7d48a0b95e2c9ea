//! Account pairing, onboarding and per-account configuration migration.

use std::collections::HashMap;

use conformity_api::models::Account;
use conformity_api::models::AccountDetails;
use serde_json::Value;
use tracing::{info, warn};

use crate::categories::checks::copy_suppressed_checks;
use crate::categories::communication::migrate_communication_settings;
use crate::categories::report_configs::{migrate_report_configs, ReportScope};
use crate::categories::MigrationContext;
use crate::confirm::Prompter;
use crate::error::{MigrationError, MigrationResult};
use crate::notes::consolidate_notes;
use crate::poller::wait_for_bot_scan;
use crate::recipients::RecipientResolver;

/// A source account and its counterpart on the target.
#[derive(Debug, Clone)]
pub struct AccountPairing {
    pub source_acct_id: String,
    pub target_acct_id: String,
}

/// Pair every source account with a target account by provider identity
/// (AWS account number / Azure subscription id), onboarding the missing
/// ones.  An existing account is only included after the operator confirms
/// the overwrite; unsupported cloud types are reported and skipped.
pub async fn pair_accounts(ctx: &MigrationContext<'_>) -> MigrationResult<Vec<AccountPairing>> {
    let source_accounts = ctx.source.list_accounts().await?;
    let target_accounts = ctx.target.list_accounts().await?;

    let mut pairings = Vec::new();
    for account in &source_accounts {
        if !matches!(account.cloud_type.as_str(), "aws" | "azure") {
            warn!(
                cloud_type = %account.cloud_type,
                account = %account.name,
                "Cloud type not supported yet, skipping account"
            );
            continue;
        }

        let existing = target_accounts.iter().find(|t| {
            t.cloud_type == account.cloud_type
                && t.provider_identity().is_some()
                && t.provider_identity() == account.provider_identity()
        });

        let target_acct_id = match existing {
            Some(existing) => {
                info!(
                    account = %account.name,
                    environment = %account.environment,
                    "Account already exists on the target"
                );
                let message = format!(
                    "Account {}{} already exists on the target. Migrate its configuration \
                     (existing settings will be overwritten)?",
                    account.name,
                    env_suffix(account)
                );
                if !ctx.prompter.confirm_sure(&message) {
                    continue;
                }
                existing.account_id.clone()
            }
            None => {
                info!(
                    account = %account.name,
                    environment = %account.environment,
                    cloud_type = %account.cloud_type,
                    "Onboarding account on the target"
                );
                match account.cloud_type.as_str() {
                    "aws" => onboard_aws_account(ctx, account).await?,
                    _ => onboard_azure_account(ctx, account).await?,
                }
            }
        };

        pairings.push(AccountPairing {
            source_acct_id: account.account_id.clone(),
            target_acct_id,
        });
    }

    Ok(pairings)
}

fn env_suffix(account: &Account) -> String {
    if account.environment.is_empty() {
        String::new()
    } else {
        format!(" ({})", account.environment)
    }
}

/// Onboard an AWS account.  The existing CloudConformity stack must be
/// re-pointed at the target organisation's external id first, which only
/// the operator can do, so the instructions block until confirmed.
async fn onboard_aws_account(
    ctx: &MigrationContext<'_>,
    account: &Account,
) -> MigrationResult<String> {
    let new_external_id = ctx.target.get_organisation_external_id().await?;
    let access = ctx
        .source
        .get_account_access_configuration(&account.account_id)
        .await?;
    let role_arn = access
        .get("roleArn")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            MigrationError::MissingData(format!("account '{}' has no role ARN", account.name))
        })?;
    let old_external_id = access
        .get("externalId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let aws_acct_num = account.provider_identity().unwrap_or_default();

    let instructions = format!(
        "Grant the target organisation access to AWS account {aws_acct_num}:\n\
         \x20   1. Sign in to the AWS console for account {aws_acct_num}\n\
         \x20   2. Go to CloudFormation and find the stack named CloudConformity\n\
         \x20   3. Click Update to edit the stack\n\
         \x20   4. Under Prepare Template, choose 'Use current template' and click Next\n\
         \x20   5. Under Parameters, change the ExternalID value:\n\
         \x20       Old value: {old_external_id}\n\
         \x20       New value: {new_external_id}"
    );
    wait_until_confirmed(ctx.prompter, &instructions);

    let created = ctx
        .target
        .add_aws_account(&account.name, &account.environment, role_arn, &new_external_id)
        .await?;
    created_account_id(&created, account)
}

/// Onboard an Azure subscription, reusing the directory id recorded on the
/// source's managed group.
async fn onboard_azure_account(
    ctx: &MigrationContext<'_>,
    account: &Account,
) -> MigrationResult<String> {
    let subscription_id = account.provider_identity().ok_or_else(|| {
        MigrationError::MissingData(format!("account '{}' has no subscription id", account.name))
    })?;
    let group_id = account.managed_group_id.as_deref().ok_or_else(|| {
        MigrationError::MissingData(format!("account '{}' has no managed group", account.name))
    })?;
    let group = ctx.source.get_group_details(group_id).await?;
    let directory_id = group
        .pointer("/attributes/cloud-data/azure/directoryId")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            MigrationError::MissingData(format!(
                "managed group of account '{}' has no Azure directory id",
                account.name
            ))
        })?;

    let created = ctx
        .target
        .add_azure_subscription(
            &account.name,
            &account.environment,
            &subscription_id,
            directory_id,
        )
        .await?;
    created_account_id(&created, account)
}

fn created_account_id(created: &Value, account: &Account) -> MigrationResult<String> {
    created
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            MigrationError::MissingData(format!(
                "target returned no id when onboarding account '{}'",
                account.name
            ))
        })
}

fn wait_until_confirmed(prompter: &dyn Prompter, message: &str) {
    while !prompter.confirm(&format!("{message}\nDo you want to continue?")) {}
}

/// Copy one account's full configuration: tags, bot settings, rule settings
/// with their consolidated note history, communication settings, report
/// configs and suppressed checks.
pub async fn migrate_account_configuration(
    ctx: &MigrationContext<'_>,
    pairing: &AccountPairing,
    resolver: &RecipientResolver,
    source_user_names: &HashMap<String, String>,
    target_org_id: &str,
) -> MigrationResult<()> {
    let details = ctx.source.get_account_details(&pairing.source_acct_id).await?;
    info!(
        account = %details.account.name,
        environment = %details.account.environment,
        cloud_type = %details.account.cloud_type,
        "Migrating account configuration"
    );

    info!("Updating account tags");
    ctx.target
        .update_account(
            &pairing.target_acct_id,
            &details.account.name,
            &details.account.environment,
            &details.tags,
        )
        .await?;

    info!("Copying account bot settings");
    ctx.target
        .update_account_bot_settings(&pairing.target_acct_id, &details.bot_settings)
        .await?;

    info!("Copying account rule settings");
    copy_rule_settings(ctx, pairing, &details, source_user_names).await?;

    info!("Copying communication channel settings");
    migrate_communication_settings(
        ctx,
        resolver,
        Some(&pairing.source_acct_id),
        Some(&pairing.target_acct_id),
        target_org_id,
    )
    .await?;

    migrate_report_configs(
        ctx,
        ReportScope::Account {
            source_acct_id: &pairing.source_acct_id,
            target_acct_id: &pairing.target_acct_id,
        },
    )
    .await?;

    // A limit-one probe avoids walking the whole collection when there is
    // nothing to migrate.
    let probe = ctx
        .source
        .get_suppressed_checks(&pairing.source_acct_id, 1)
        .await?;
    if probe.is_empty() {
        info!("No suppressed check found to migrate");
        return Ok(());
    }

    info!("Waiting for the target bot scan to finish");
    wait_for_bot_scan(
        ctx.target,
        &pairing.target_acct_id,
        ctx.settings.bot_scan_interval,
    )
    .await?;

    info!("Copying suppressed checks");
    copy_suppressed_checks(ctx, pairing).await
}

async fn copy_rule_settings(
    ctx: &MigrationContext<'_>,
    pairing: &AccountPairing,
    details: &AccountDetails,
    source_user_names: &HashMap<String, String>,
) -> MigrationResult<()> {
    for rule in details.configured_rules() {
        info!(
            rule = %rule.id,
            enabled = rule.enabled,
            "Copying rule setting"
        );
        let rule_with_notes = ctx
            .source
            .get_account_rule_setting(&pairing.source_acct_id, &rule.id, true)
            .await?;
        let note = consolidate_notes(&rule_with_notes.notes, source_user_names);
        ctx.target
            .update_account_rule_setting(
                &pairing.target_acct_id,
                &rule.id,
                &rule_with_notes.setting,
                &note,
            )
            .await?;
    }
    Ok(())
}
