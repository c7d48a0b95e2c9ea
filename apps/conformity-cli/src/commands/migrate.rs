//! The migration run itself.
//!
//! Categories run in dependency order (users before communication settings,
//! account pairing before per-account configuration).  A failure in one
//! category is reported and the run moves on; only account pairing and user
//! sync abort the whole run, because everything after them needs their
//! results.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::warn;

use conformity_client::{ApiAuth, ConformityClient, RetryPolicy};
use conformity_migration::categories::accounts::{migrate_account_configuration, pair_accounts};
use conformity_migration::categories::communication::migrate_communication_settings;
use conformity_migration::categories::groups::{
    migrate_managed_groups, migrate_user_defined_groups,
};
use conformity_migration::categories::profiles::{
    migrate_custom_profiles, migrate_organisation_profile,
};
use conformity_migration::categories::report_configs::{
    migrate_group_report_configs, migrate_report_configs, ReportScope,
};
use conformity_migration::categories::users::sync_users;
use conformity_migration::{
    AssumeAnswer, MigrationContext, MigrationSettings, Prompter, RecipientResolver,
};

use crate::config::{AppConfig, EndpointConfig, MigrationTuning};
use crate::error::{CliError, CliResult};
use crate::output::{print_header, print_success, print_warning};
use crate::prompts::ConsolePrompter;

/// Arguments for the migrate command
#[derive(Args)]
pub struct MigrateArgs {
    /// Path to the configuration file
    #[arg(long, value_name = "FILE", default_value = "conformity-migration.yml")]
    pub config: PathBuf,

    /// Answer yes to every confirmation prompt (non-interactive run)
    #[arg(long)]
    pub assume_yes: bool,
}

pub async fn execute(args: MigrateArgs) -> CliResult<()> {
    let config = AppConfig::load(&args.config)?;

    let retry = retry_policy(&config.migration);
    let connect_timeout = Duration::from_secs(config.migration.connect_timeout_secs);
    let read_timeout = Duration::from_secs(config.migration.read_timeout_secs);
    let source = ConformityClient::new(
        config.legacy_base_url(),
        endpoint_auth(&config.legacy),
        connect_timeout,
        read_timeout,
    )?
    .with_retry_policy(retry.clone());
    let target = ConformityClient::new(
        config.cloud_one_base_url(),
        endpoint_auth(&config.cloud_one),
        connect_timeout,
        read_timeout,
    )?
    .with_retry_policy(retry);

    let console = ConsolePrompter;
    let assume = AssumeAnswer(true);
    let prompter: &dyn Prompter = if args.assume_yes { &assume } else { &console };

    let settings = MigrationSettings {
        bot_scan_interval: Duration::from_secs(config.migration.bot_scan_interval_secs),
        note_truncation_len: config.migration.note_truncation_len,
    };
    let ctx = MigrationContext {
        source: &source,
        target: &target,
        prompter,
        settings: &settings,
    };

    print_header("Conformity Migration");
    let target_org_id = target.get_organisation_id().await?;
    let mut failed: Vec<String> = Vec::new();

    run_step(&mut failed, "organisation profile", {
        migrate_organisation_profile(&ctx).await
    });
    run_step(&mut failed, "managed groups", {
        migrate_managed_groups(&ctx).await
    });

    // Later steps depend on accounts and users, so these two are fatal.
    let pairings = pair_accounts(&ctx).await?;
    let source_users = source.get_all_users().await?;
    let target_users = target.get_all_users().await?;
    let target_users = sync_users(&ctx, &source_users, &target_users).await?;
    let resolver = RecipientResolver::new(&source_users, &target_users);
    let source_user_names: HashMap<String, String> = source_users
        .iter()
        .map(|u| (u.user_id.clone(), u.full_name()))
        .collect();

    run_step(&mut failed, "user-defined groups", {
        migrate_user_defined_groups(&ctx).await
    });
    run_step(&mut failed, "custom profiles", {
        migrate_custom_profiles(&ctx).await
    });
    run_step(&mut failed, "organisation report configs", {
        migrate_report_configs(&ctx, ReportScope::Organisation).await
    });
    run_step(&mut failed, "group report configs", {
        migrate_group_report_configs(&ctx).await
    });
    run_step(&mut failed, "organisation communication settings", {
        migrate_communication_settings(&ctx, &resolver, None, None, &target_org_id).await
    });

    for pairing in &pairings {
        let label = format!("account {}", pairing.source_acct_id);
        run_step(&mut failed, &label, {
            migrate_account_configuration(
                &ctx,
                pairing,
                &resolver,
                &source_user_names,
                &target_org_id,
            )
            .await
        });
    }

    if failed.is_empty() {
        print_success("Migration complete");
        Ok(())
    } else {
        for category in &failed {
            print_warning(&format!("Migration of {category} did not finish"));
        }
        Err(CliError::Partial(failed))
    }
}

fn run_step<E: std::fmt::Display>(
    failed: &mut Vec<String>,
    category: &str,
    result: Result<(), E>,
) {
    if let Err(error) = result {
        warn!(category, %error, "Category failed, continuing with the rest");
        failed.push(category.to_string());
    }
}

fn endpoint_auth(endpoint: &EndpointConfig) -> ApiAuth {
    let auth = ApiAuth::new(endpoint.api_key.clone());
    match &endpoint.content_type {
        Some(content_type) => auth.with_content_type(content_type.as_str()),
        None => auth,
    }
}

fn retry_policy(tuning: &MigrationTuning) -> RetryPolicy {
    RetryPolicy {
        max_retries: tuning.max_retry_attempts,
        base_delay_secs: tuning.backoff_base_secs,
        max_delay_secs: 60,
        retryable_statuses: tuning.retryable_statuses.iter().copied().collect::<BTreeSet<u16>>(),
    }
}
