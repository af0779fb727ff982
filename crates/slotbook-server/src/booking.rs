//! The booking write path.
//!
//! `Received -> TimeNormalized -> EventCreated -> Complete`, with the CRM
//! sync running detached from `EventCreated` onward. Once the calendar has
//! accepted the event nothing downstream can turn the booking into a
//! failure.
//!
//! There is no re-check that the slot is still free at write time. Two
//! visitors holding the same availability view can both book it.

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use slotbook_core::{BookingPhase, BookingRequest, parse_booking_time, validate};
use slotbook_protocol::{BookingPayload, BookingResult};
use slotbook_providers::{CalendarProvider, CreatedEvent, CrmStore, NewEvent};
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::contact::ContactUpsert;
use crate::crm_sync::{CrmSyncHandle, CrmSyncJob, spawn_crm_sync};
use crate::error::{ServiceError, ServiceResult};

/// Phases a booking has passed through, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTrace {
    phases: Vec<BookingPhase>,
}

impl Default for PhaseTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTrace {
    /// Starts a trace at [`BookingPhase::Received`].
    pub fn new() -> Self {
        Self {
            phases: vec![BookingPhase::Received],
        }
    }

    /// Returns the latest phase.
    pub fn current(&self) -> BookingPhase {
        self.phases
            .last()
            .copied()
            .unwrap_or(BookingPhase::Received)
    }

    /// Records a transition. Illegal transitions are ignored and logged.
    pub fn advance(&mut self, next: BookingPhase) -> bool {
        let current = self.current();
        if !current.can_advance_to(next) {
            warn!(from = %current, to = %next, "Illegal booking phase transition");
            return false;
        }
        debug!(from = %current, to = %next, "Booking phase");
        self.phases.push(next);
        true
    }

    /// Returns every recorded phase.
    pub fn phases(&self) -> &[BookingPhase] {
        &self.phases
    }
}

/// A booking the calendar accepted.
#[derive(Debug)]
pub struct BookingReceipt {
    /// The validated request.
    pub request: BookingRequest,
    /// The event as the calendar reported it.
    pub event: CreatedEvent,
    /// Start in the owner zone.
    pub start: DateTime<Tz>,
    /// End in the owner zone.
    pub end: DateTime<Tz>,
    /// Phases of the caller-visible path.
    pub trace: PhaseTrace,
    crm_sync: Option<CrmSyncHandle>,
}

impl BookingReceipt {
    /// Returns the wire result.
    pub fn result(&self) -> BookingResult {
        BookingResult::booked(self.event.id.clone())
            .with_conference_uri(self.event.conference_uri.clone())
    }

    /// Takes the CRM sync handle. Dropping it leaves the sync detached.
    pub fn take_crm_sync(&mut self) -> Option<CrmSyncHandle> {
        self.crm_sync.take()
    }
}

/// Drives a booking from payload to calendar event.
pub struct BookingOrchestrator {
    config: Arc<ServiceConfig>,
    calendar: Arc<dyn CalendarProvider>,
    contacts: ContactUpsert,
}

impl BookingOrchestrator {
    /// Creates an orchestrator writing to `calendar` and mirroring into `crm`.
    pub fn new(
        config: Arc<ServiceConfig>,
        calendar: Arc<dyn CalendarProvider>,
        crm: Arc<dyn CrmStore>,
    ) -> Self {
        let contacts = ContactUpsert::from_config(crm, &config);
        Self {
            config,
            calendar,
            contacts,
        }
    }

    /// Books a slot.
    ///
    /// Authentication and validation failures return before any remote
    /// call. A calendar failure is returned as-is. The CRM sync is spawned
    /// after the event exists and its outcome never reaches the caller.
    pub async fn book(&self, payload: &BookingPayload) -> ServiceResult<BookingReceipt> {
        let mut trace = PhaseTrace::new();

        if !self.calendar.is_authenticated() {
            warn!(provider = %self.calendar.name(), "Booking refused: calendar not authenticated");
            return Err(ServiceError::authentication(format!(
                "calendar provider '{}' has no valid credential",
                self.calendar.name()
            )));
        }

        let request = self.normalize(payload)?;
        let owner = self.config.owner_zone;
        let start = owner.to_local(request.start_time);
        let end = owner.to_local(request.end_time);
        trace.advance(BookingPhase::TimeNormalized);

        let event = NewEvent {
            summary: format!("{} {}", self.config.summary_prefix, request.name.trim()),
            description: request
                .trimmed_notes()
                .unwrap_or("No notes provided.")
                .to_string(),
            start,
            end,
            attendees: request.attendees(),
            dedup_token: request.idempotency_key(),
            conference: self.config.request_conference,
        };

        let created = self
            .calendar
            .create_event(&self.config.calendar_id, event)
            .await
            .map_err(|e| {
                warn!(
                    provider = %self.calendar.name(),
                    phase = %trace.current(),
                    error = %e,
                    "Calendar event creation failed"
                );
                ServiceError::from(e)
            })?;
        trace.advance(BookingPhase::EventCreated);

        info!(
            event_id = %created.id,
            email = %request.email,
            start = %start.to_rfc3339(),
            "Booked slot"
        );

        let job = CrmSyncJob {
            email: request.email.clone(),
            name: request.name.clone(),
            meeting_date: start.date_naive(),
            notes: request.trimmed_notes().map(str::to_string),
        };
        let crm_sync = spawn_crm_sync(self.contacts.clone(), job, created.id.clone());
        trace.advance(BookingPhase::Complete);

        Ok(BookingReceipt {
            request,
            event: created,
            start,
            end,
            trace,
            crm_sync: Some(crm_sync),
        })
    }

    /// Parses and validates the payload. Zone-less times are read in the
    /// viewer zone; an unknown viewer zone reads them as UTC.
    fn normalize(&self, payload: &BookingPayload) -> ServiceResult<BookingRequest> {
        let viewer = validate(&payload.viewer_timezone);
        let request = BookingRequest {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_string(),
            notes: payload.notes.clone(),
            guests: payload.guests.clone(),
            start_time: parse_booking_time("startTime", &payload.start_time, &viewer)?,
            end_time: parse_booking_time("endTime", &payload.end_time, &viewer)?,
            viewer_timezone: viewer.name().to_string(),
        };
        request.validate()?;
        Ok(request)
    }
}
