//! Booking request types, validation and the idempotency key.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::zone::ValidatedZone;

/// Rejections raised before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An email address is malformed.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// A time value could not be parsed.
    #[error("invalid {field}: {value}")]
    InvalidTime {
        /// Field name as seen by the caller.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The interval ends at or before it starts.
    #[error("end time must be after start time")]
    EmptyInterval,

    /// A calendar date could not be parsed.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Loose structural check: `local@domain.tld`, no whitespace.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

/// Returns `true` if `value` looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Parses a booking time.
///
/// RFC 3339 values are taken as instants. Values without an offset
/// (`2024-03-10T09:00:00` or `2024-03-10T09:00`) are wall-clock times in
/// `viewer`.
pub fn parse_booking_time(
    field: &'static str,
    value: &str,
    viewer: &ValidatedZone,
) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|local| viewer.from_wall_clock(local))
        .ok_or_else(|| ValidationError::InvalidTime {
            field,
            value: trimmed.to_string(),
        })
}

/// A booking submitted by a visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Visitor's display name.
    pub name: String,
    /// Visitor's email; also the contact key in the CRM.
    pub email: String,
    /// Free-text notes for the meeting.
    pub notes: Option<String>,
    /// Additional attendee emails.
    pub guests: Vec<String>,
    /// Meeting start.
    pub start_time: DateTime<Utc>,
    /// Meeting end.
    pub end_time: DateTime<Utc>,
    /// IANA zone the visitor picked the slot in.
    pub viewer_timezone: String,
}

impl BookingRequest {
    /// Checks required fields, email syntax and interval ordering.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        if let Some(bad) = self.guests.iter().find(|g| !is_valid_email(g.trim())) {
            return Err(ValidationError::InvalidEmail(bad.clone()));
        }
        if self.end_time <= self.start_time {
            return Err(ValidationError::EmptyInterval);
        }
        Ok(())
    }

    /// Returns the notes with surrounding whitespace removed, if any remain.
    pub fn trimmed_notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// Booker first, then guests de-duplicated case-insensitively. The
    /// booker's own address is never repeated as a guest.
    pub fn attendees(&self) -> Vec<String> {
        let primary = self.email.trim().to_string();
        let mut seen = vec![primary.to_lowercase()];
        let mut attendees = vec![primary];
        for guest in &self.guests {
            let guest = guest.trim();
            let key = guest.to_lowercase();
            if guest.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            attendees.push(guest.to_string());
        }
        attendees
    }

    /// Content-derived idempotency key: SHA-256 of the normalised email and
    /// start instant, hex encoded.
    ///
    /// Retrying the same booking yields the same key, so the calendar does
    /// not create a second conference for it.
    pub fn idempotency_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.email.trim().to_lowercase().as_bytes());
        hasher.update(b"|");
        hasher.update(self.start_time.timestamp().to_le_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Phases of the booking write path.
///
/// `Received -> TimeNormalized -> EventCreated -> (CrmSynced | CrmSyncFailed)
/// -> Complete`. Only the first two transitions can fail the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingPhase {
    /// Request accepted for processing.
    Received,
    /// Start/end resolved into the owner zone.
    TimeNormalized,
    /// The calendar accepted the event.
    EventCreated,
    /// The contact was reconciled in the CRM.
    CrmSynced,
    /// The CRM reconciliation failed; the booking stands.
    CrmSyncFailed,
    /// The caller-visible result has been produced.
    Complete,
}

impl BookingPhase {
    /// Returns `true` if `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: BookingPhase) -> bool {
        use BookingPhase::*;
        matches!(
            (self, next),
            (Received, TimeNormalized)
                | (TimeNormalized, EventCreated)
                | (EventCreated, CrmSynced)
                | (EventCreated, CrmSyncFailed)
                | (EventCreated, Complete)
                | (CrmSynced, Complete)
                | (CrmSyncFailed, Complete)
        )
    }

    /// Returns `true` once the calendar event exists; nothing after this
    /// point may roll it back.
    pub fn event_committed(self) -> bool {
        !matches!(self, Self::Received | Self::TimeNormalized)
    }

    /// Lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::TimeNormalized => "time_normalized",
            Self::EventCreated => "event_created",
            Self::CrmSynced => "crm_synced",
            Self::CrmSyncFailed => "crm_sync_failed",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for BookingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
