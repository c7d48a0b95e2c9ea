//! Suppressed-check migration.
//!
//! Checks are system-generated, so nothing is ever created here: each source
//! suppression is matched to the check the target's own bot scan produced
//! (by rule, region and resource) and that check is suppressed in place.

use conformity_api::models::Check;
use conformity_api::IdentityKey;
use tracing::{info, warn};

use crate::categories::accounts::AccountPairing;
use crate::categories::MigrationContext;
use crate::error::MigrationResult;
use crate::notes::{most_recent_note_text, truncate_text};

const NO_NOTE_FALLBACK: &str = "[Migration tool: No note found from the source Check]";
const TRUNCATION_SUFFIX: &str = "..";

pub async fn copy_suppressed_checks(
    ctx: &MigrationContext<'_>,
    pairing: &AccountPairing,
) -> MigrationResult<()> {
    let source_checks = ctx
        .source
        .get_suppressed_checks(&pairing.source_acct_id, 0)
        .await?;

    for check in &source_checks {
        info!(check = %check.identity_key(), "Copying suppression");
        match find_target_check(ctx, &pairing.target_acct_id, check).await? {
            Some(target_check) => suppress_target_check(ctx, check, &target_check).await?,
            None => report_missing_check(check),
        }
    }
    Ok(())
}

/// Search the target for the check matching a source suppression, narrowing
/// the scan with rule/region/resource filters.
async fn find_target_check(
    ctx: &MigrationContext<'_>,
    target_acct_id: &str,
    check: &Check,
) -> MigrationResult<Option<Check>> {
    let mut filters = vec![
        ("ruleIds", check.rule_id.as_str()),
        ("regions", check.region.as_str()),
    ];
    if !check.resource.is_empty() {
        filters.push(("resourceSearchMode", "text"));
        filters.push(("resource", check.resource.as_str()));
    }

    let mut pager = ctx.target.checks_pager(target_acct_id, &filters, 0);
    while let Some(resource) = pager.try_next().await? {
        let candidate = Check::from_resource(&resource)?;
        if candidate.identity_key() == check.identity_key() {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

async fn suppress_target_check(
    ctx: &MigrationContext<'_>,
    source_check: &Check,
    target_check: &Check,
) -> MigrationResult<()> {
    // The note history lives on the check detail, not the listing.
    let detail = ctx
        .source
        .get_check_detail(&source_check.check_id, true, 100)
        .await?;
    let mut note = most_recent_note_text(&detail.notes);
    if note.is_empty() {
        note = NO_NOTE_FALLBACK.to_string();
    }
    let note = truncate_text(&note, ctx.settings.note_truncation_len, TRUNCATION_SUFFIX);

    ctx.target
        .suppress_check(&target_check.check_id, source_check.suppressed_until, &note)
        .await?;
    Ok(())
}

fn report_missing_check(check: &Check) {
    warn!(
        rule = %check.rule_id,
        region = %check.region,
        resource = %check.resource,
        message = %check.message,
        "No corresponding check on the target. Suppress it manually or re-run after the next bot scan"
    );
}
