//! Request and response types for the slotbook booking surface.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slotbook_core::SlotStatus;

/// Requests accepted by the booking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Slot verdicts for one day.
    GetAvailability {
        /// Calendar date, `YYYY-MM-DD`.
        date: String,
        /// IANA zone the visitor is browsing in. Unknown values degrade to UTC.
        #[serde(default, alias = "viewerTimezone")]
        timezone: String,
    },

    /// Reserve a slot.
    Book {
        /// The booking form.
        #[serde(flatten)]
        booking: BookingPayload,
    },

    /// Liveness check.
    Ping,
}

impl Request {
    /// Creates a GetAvailability request.
    pub fn availability(date: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self::GetAvailability {
            date: date.into(),
            timezone: timezone.into(),
        }
    }

    /// Creates a Book request.
    pub fn book(booking: BookingPayload) -> Self {
        Self::Book { booking }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetAvailability { .. } => "get_availability",
            Self::Book { .. } => "book",
            Self::Ping => "ping",
        }
    }
}

/// The booking form as submitted by a visitor.
///
/// Times are strings: RFC 3339 instants, or zone-less local date-times read
/// in `viewer_timezone`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    /// Visitor's name.
    #[serde(default)]
    pub name: String,
    /// Visitor's email.
    #[serde(default)]
    pub email: String,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Extra attendee emails.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guests: Vec<String>,
    /// Meeting start.
    #[serde(default)]
    pub start_time: String,
    /// Meeting end.
    #[serde(default)]
    pub end_time: String,
    /// Zone the slot was picked in.
    #[serde(default)]
    pub viewer_timezone: String,
}

impl BookingPayload {
    /// Creates a payload with the required fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        viewer_timezone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            notes: None,
            guests: Vec::new(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            viewer_timezone: viewer_timezone.into(),
        }
    }

    /// Builder: set notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Builder: add a guest.
    pub fn with_guest(mut self, email: impl Into<String>) -> Self {
        self.guests.push(email.into());
        self
    }
}

/// One slot as shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    /// Start, RFC 3339 with the viewer's offset.
    pub start: String,
    /// End, RFC 3339 with the viewer's offset.
    pub end: String,
    /// Viewer-local start, `HH:MM`.
    pub label: String,
    /// `status == free`.
    pub available: bool,
    /// Verdict.
    pub status: SlotStatus,
}

/// Availability for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityView {
    /// The requested date.
    pub date: NaiveDate,
    /// Resolved viewer zone (UTC if the requested one was unknown).
    pub viewer_timezone: String,
    /// Short label of the viewer zone on that date, e.g. `JST`.
    pub viewer_zone_abbreviation: String,
    /// The calendar owner's zone.
    pub owner_timezone: String,
    /// Slots in start order.
    pub slots: Vec<SlotView>,
}

impl AvailabilityView {
    /// Returns the slots that can be booked.
    pub fn available(&self) -> impl Iterator<Item = &SlotView> {
        self.slots.iter().filter(|s| s.available)
    }
}

/// Result of a booking attempt: `{success: true, …}` or
/// `{success: false, reason, code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResult {
    /// Whether the calendar accepted the event.
    pub success: bool,
    /// Calendar event id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Conference join link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_uri: Option<String>,
    /// Why the booking failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Failure category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl BookingResult {
    /// Creates a success result.
    pub fn booked(event_id: impl Into<String>) -> Self {
        Self {
            success: true,
            event_id: Some(event_id.into()),
            conference_uri: None,
            reason: None,
            code: None,
        }
    }

    /// Creates a failure result.
    pub fn failed(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            event_id: None,
            conference_uri: None,
            reason: Some(reason.into()),
            code: Some(code),
        }
    }

    /// Builder: set the conference link.
    pub fn with_conference_uri(mut self, uri: Option<String>) -> Self {
        self.conference_uri = uri;
        self
    }
}

/// Responses produced by the booking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Answer to GetAvailability.
    Availability {
        /// The day's slots.
        #[serde(flatten)]
        view: AvailabilityView,
    },

    /// Answer to Book.
    Booking {
        /// Outcome.
        #[serde(flatten)]
        result: BookingResult,
    },

    /// Error response.
    Error {
        /// Error details.
        #[serde(flatten)]
        error: ErrorResponse,
    },

    /// Pong response to Ping.
    Pong,
}

impl Response {
    /// Creates an Availability response.
    pub fn availability(view: AvailabilityView) -> Self {
        Self::Availability { view }
    }

    /// Creates a Booking response.
    pub fn booking(result: BookingResult) -> Self {
        Self::Booking { result }
    }

    /// Creates an Error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse::new(code, message),
        }
    }

    /// Returns false for errors and failed bookings.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Error { .. } => false,
            Self::Booking { result } => result.success,
            _ => true,
        }
    }

    /// Returns the error if this is an error response.
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Caller-visible failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unknown or internal error.
    InternalError,

    /// Missing or malformed request fields.
    InvalidRequest,

    /// No valid credential for the owner's calendar.
    AuthenticationFailed,

    /// The calendar was unreachable or refused the operation.
    ProviderError,
}

impl ErrorCode {
    /// Returns a human-readable description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InternalError => "An internal error occurred",
            Self::InvalidRequest => "The request was invalid",
            Self::AuthenticationFailed => "Calendar authentication failed",
            Self::ProviderError => "Calendar provider returned an error",
        }
    }
}

/// Error response details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}
