//! Subcommand implementations.

pub mod availability;
pub mod book;
pub mod config;
pub mod request;

use std::time::Duration;

use slotbook_server::CrmSyncHandle;
use tracing::{debug, warn};

/// Gives a detached CRM sync up to `grace` to finish before the process
/// exits. An unfinished sync is abandoned.
pub(crate) async fn settle_crm_sync(sync: Option<CrmSyncHandle>, grace: Duration) {
    let Some(sync) = sync else {
        return;
    };
    let event_id = sync.event_id().to_string();
    match sync.wait(grace).await {
        Some(phase) => debug!(event_id = %event_id, %phase, "CRM sync settled"),
        None => warn!(
            event_id = %event_id,
            grace_secs = grace.as_secs(),
            "Exiting before CRM sync finished; the contact may not be updated"
        ),
    }
}
