//! In-process calendar.
//!
//! Used by tests and by the CLI's `--calendar memory` mode. Events written
//! through [`CalendarProvider::create_event`] show up as busy time in later
//! free/busy queries, like a real calendar.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use slotbook_core::{BusyInterval, TimeWindow};
use tracing::debug;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::provider::{BoxFuture, CalendarProvider, CreatedEvent, NewEvent};

/// An event held by [`MemoryCalendar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    /// Assigned id.
    pub id: String,
    /// Calendar it was written to.
    pub calendar_id: String,
    /// The event as submitted.
    pub event: NewEvent,
    /// Whether a new conference was created for this write.
    pub conference_created: bool,
}

#[derive(Debug, Default)]
struct State {
    busy: Vec<(String, BusyInterval)>,
    events: Vec<StoredEvent>,
    free_busy_calls: usize,
}

/// A calendar kept in memory.
#[derive(Debug)]
pub struct MemoryCalendar {
    authenticated: bool,
    fail_with: Option<ProviderErrorCode>,
    state: Mutex<State>,
}

impl Default for MemoryCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCalendar {
    /// Creates an empty, authenticated calendar.
    pub fn new() -> Self {
        Self {
            authenticated: true,
            fail_with: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Marks the calendar as lacking a credential.
    #[must_use]
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Makes every remote operation fail with `code`.
    #[must_use]
    pub fn failing(mut self, code: ProviderErrorCode) -> Self {
        self.fail_with = Some(code);
        self
    }

    /// Adds pre-existing busy time to `calendar_id`.
    #[must_use]
    pub fn with_busy(self, calendar_id: impl Into<String>, busy: BusyInterval) -> Self {
        self.lock().busy.push((calendar_id.into(), busy));
        self
    }

    /// Returns every event written so far, in order.
    pub fn events(&self) -> Vec<StoredEvent> {
        self.lock().events.clone()
    }

    /// Returns how many free/busy queries were served.
    pub fn free_busy_calls(&self) -> usize {
        self.lock().free_busy_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> ProviderResult<()> {
        match self.fail_with {
            Some(code) => Err(ProviderError::new(code, "configured to fail").with_provider("memory")),
            None => Ok(()),
        }
    }
}

impl CalendarProvider for MemoryCalendar {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn query_free_busy(
        &self,
        calendar_id: &str,
        window: TimeWindow,
    ) -> BoxFuture<'_, ProviderResult<Vec<BusyInterval>>> {
        let result = self.check().map(|()| {
            let mut state = self.lock();
            state.free_busy_calls += 1;
            let mut busy: Vec<BusyInterval> = state
                .busy
                .iter()
                .filter(|(id, _)| id == calendar_id)
                .map(|(_, b)| *b)
                .chain(
                    state
                        .events
                        .iter()
                        .filter(|e| e.calendar_id == calendar_id)
                        .filter_map(|e| {
                            BusyInterval::new(
                                e.event.start.with_timezone(&Utc),
                                e.event.end.with_timezone(&Utc),
                            )
                        }),
                )
                .filter(|b| b.window().overlaps(&window))
                .collect();
            busy.sort_by_key(|b| b.start);
            busy
        });
        Box::pin(async move { result })
    }

    fn create_event(
        &self,
        calendar_id: &str,
        event: NewEvent,
    ) -> BoxFuture<'_, ProviderResult<CreatedEvent>> {
        let result = self.check().map(|()| {
            let mut state = self.lock();
            let conference_created = event.conference
                && !state
                    .events
                    .iter()
                    .any(|e| e.conference_created && e.event.dedup_token == event.dedup_token);
            let id = format!("mem-{}", state.events.len() + 1);
            debug!(event_id = %id, calendar_id, "stored event");
            state.events.push(StoredEvent {
                id: id.clone(),
                calendar_id: calendar_id.to_string(),
                event,
                conference_created,
            });
            CreatedEvent::new(id)
        });
        Box::pin(async move { result })
    }
}
