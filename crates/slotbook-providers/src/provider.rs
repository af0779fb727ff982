//! CalendarProvider trait definition.
//!
//! A provider answers two questions for the owner's calendar: when is it
//! busy, and can this event be written to it. Everything else (sessions,
//! token refresh, retries) belongs to the concrete implementation.

use std::future::Future;
use std::pin::Pin;

use chrono::DateTime;
use chrono_tz::Tz;
use slotbook_core::{BusyInterval, TimeWindow};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Keeps [`CalendarProvider`] and [`CrmStore`](crate::CrmStore) object-safe
/// so services can hold them as `Arc<dyn …>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An event to be written to the owner's calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Event title.
    pub summary: String,
    /// Event body.
    pub description: String,
    /// Start, expressed in the owner zone.
    pub start: DateTime<Tz>,
    /// End, expressed in the owner zone.
    pub end: DateTime<Tz>,
    /// Attendee emails; the first is the booker.
    pub attendees: Vec<String>,
    /// Content-derived token; retries with the same token must not create
    /// a second conference.
    pub dedup_token: String,
    /// Ask the calendar to attach a video conference.
    pub conference: bool,
}

impl NewEvent {
    /// Returns the IANA name of the zone the event is expressed in.
    pub fn time_zone(&self) -> &'static str {
        self.start.timezone().name()
    }
}

/// The identity of an event the calendar accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    /// Provider event id.
    pub id: String,
    /// Link to the event in the calendar UI, if the provider returned one.
    pub html_link: Option<String>,
    /// Conference join link, if one was attached.
    pub conference_uri: Option<String>,
}

impl CreatedEvent {
    /// Creates an event identity with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html_link: None,
            conference_uri: None,
        }
    }
}

/// The remote calendar the availability and booking paths talk to.
///
/// Implementations must be `Send + Sync`; a single instance is shared by
/// every request.
pub trait CalendarProvider: Send + Sync {
    /// Returns the provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns `true` if the provider holds a usable credential.
    ///
    /// Checked before any remote call so a missing session fails fast.
    fn is_authenticated(&self) -> bool;

    /// Returns the busy intervals of `calendar_id` that intersect `window`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the calendar cannot be read. Callers must
    /// not treat a failure as "no busy time".
    fn query_free_busy(
        &self,
        calendar_id: &str,
        window: TimeWindow,
    ) -> BoxFuture<'_, ProviderResult<Vec<BusyInterval>>>;

    /// Writes an event to `calendar_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the calendar rejects the write.
    fn create_event(
        &self,
        calendar_id: &str,
        event: NewEvent,
    ) -> BoxFuture<'_, ProviderResult<CreatedEvent>>;
}

/// A provider that always fails with the same error.
///
/// Stands in for a backend that could not be constructed.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    /// Creates a new error provider.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn error(&self) -> ProviderError {
        self.error.detached().with_provider(&self.name)
    }
}

impl CalendarProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_authenticated(&self) -> bool {
        !self.error.is_authentication()
    }

    fn query_free_busy(
        &self,
        _calendar_id: &str,
        _window: TimeWindow,
    ) -> BoxFuture<'_, ProviderResult<Vec<BusyInterval>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn create_event(
        &self,
        _calendar_id: &str,
        _event: NewEvent,
    ) -> BoxFuture<'_, ProviderResult<CreatedEvent>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::{TimeZone, Utc};

    fn event() -> NewEvent {
        let london: Tz = "Europe/London".parse().unwrap();
        let start = Utc
            .with_ymd_and_hms(2024, 7, 1, 9, 0, 0)
            .unwrap()
            .with_timezone(&london);
        NewEvent {
            summary: "Session with Ada".into(),
            description: "No notes provided.".into(),
            start,
            end: start + chrono::Duration::minutes(30),
            attendees: vec!["ada@example.com".into()],
            dedup_token: "k".into(),
            conference: false,
        }
    }

    #[test]
    fn new_event_reports_zone() {
        assert_eq!(event().time_zone(), "Europe/London");
    }

    #[tokio::test]
    async fn error_provider_returns_error() {
        let provider = ErrorProvider::new("broken", ProviderError::server("down"));
        assert_eq!(provider.name(), "broken");
        assert!(provider.is_authenticated());

        let window = TimeWindow::horizon(Utc::now(), 1);
        let err = provider.query_free_busy("primary", window).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
        assert_eq!(err.provider(), Some("broken"));

        let err = provider.create_event("primary", event()).await.unwrap_err();
        assert_eq!(err.message(), "down");
    }

    #[test]
    fn error_provider_without_credentials() {
        let provider = ErrorProvider::new("google", ProviderError::authentication("no token"));
        assert!(!provider.is_authenticated());
    }
}
