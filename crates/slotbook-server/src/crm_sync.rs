//! Detached CRM sync task.
//!
//! A booking hands its contact details to [`spawn_crm_sync`] and returns
//! without waiting. The task's outcome goes to the log. The returned
//! [`CrmSyncHandle`] may be awaited (tests, or a CLI that is about to exit)
//! or dropped, which leaves the task running on its own.

use std::time::Duration;

use chrono::NaiveDate;
use slotbook_core::BookingPhase;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::contact::ContactUpsert;

/// The contact details mirrored into the CRM for one booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmSyncJob {
    /// Booker's email.
    pub email: String,
    /// Booker's name.
    pub name: String,
    /// Owner-local date of the meeting.
    pub meeting_date: NaiveDate,
    /// Booking notes.
    pub notes: Option<String>,
}

/// Handle to a running CRM sync.
#[derive(Debug)]
pub struct CrmSyncHandle {
    event_id: String,
    task: JoinHandle<BookingPhase>,
}

impl CrmSyncHandle {
    /// Returns the calendar event the sync belongs to.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Returns `true` once the task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits up to `timeout` for the sync to finish.
    ///
    /// Returns [`BookingPhase::CrmSynced`] or [`BookingPhase::CrmSyncFailed`],
    /// or `None` if the timeout elapsed first. The task keeps running after
    /// a timeout.
    pub async fn wait(mut self, timeout: Duration) -> Option<BookingPhase> {
        match tokio::time::timeout(timeout, &mut self.task).await {
            Ok(Ok(phase)) => Some(phase),
            Ok(Err(e)) => {
                warn!(event_id = %self.event_id, error = %e, "CRM sync task aborted");
                Some(BookingPhase::CrmSyncFailed)
            }
            Err(_) => {
                warn!(
                    event_id = %self.event_id,
                    timeout_ms = timeout.as_millis(),
                    "CRM sync still running; leaving it detached"
                );
                None
            }
        }
    }
}

/// Spawns the CRM reconciliation for a booked event.
///
/// Must be called from within a Tokio runtime. The task never panics on a
/// store failure; it logs and reports [`BookingPhase::CrmSyncFailed`].
pub fn spawn_crm_sync(upsert: ContactUpsert, job: CrmSyncJob, event_id: String) -> CrmSyncHandle {
    let task_event_id = event_id.clone();
    let task = tokio::spawn(async move {
        let result = upsert
            .reconcile(&job.email, &job.name, job.meeting_date, job.notes.as_deref())
            .await;
        match result {
            Ok(outcome) => {
                info!(
                    event_id = %task_event_id,
                    email = %job.email,
                    store = upsert.store_name(),
                    ?outcome,
                    "Contact synced to CRM"
                );
                BookingPhase::CrmSynced
            }
            Err(e) => {
                warn!(
                    event_id = %task_event_id,
                    email = %job.email,
                    store = upsert.store_name(),
                    error = %e,
                    "CRM sync failed; booking unaffected"
                );
                BookingPhase::CrmSyncFailed
            }
        }
    });
    CrmSyncHandle { event_id, task }
}
