//! Completion poller for asynchronous bot scans.

use std::time::Duration;

use conformity_client::ConformityClient;
use tracing::debug;

use crate::error::MigrationResult;

/// Block until the account's bot has no scan in flight.
///
/// Polls at a fixed interval with no deadline; a transport error aborts the
/// wait and propagates to the caller.
pub async fn wait_for_bot_scan(
    client: &ConformityClient,
    acct_id: &str,
    interval: Duration,
) -> MigrationResult<()> {
    while !client.is_bot_scan_done(acct_id).await? {
        debug!(acct_id, interval_secs = interval.as_secs(), "Bot scan still running");
        tokio::time::sleep(interval).await;
    }
    Ok(())
}
