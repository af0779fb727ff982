//! Service configuration.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use slotbook_core::{
    DEFAULT_NOTES_LIMIT, NotesTruncation, SlotWindow, ValidatedZone, ZoneError, parse_zone,
};

/// Default owner calendar id.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Default availability horizon in days.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Which wall clock the daily slot window is laid out in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    /// 09:00 means 09:00 for the calendar owner.
    #[default]
    Owner,
    /// 09:00 means 09:00 for whoever is looking.
    Viewer,
}

/// Configuration shared by the availability and booking services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The calendar owner's zone. Events are written in it.
    pub owner_zone: ValidatedZone,

    /// Calendar queried for free/busy and written to.
    pub calendar_id: String,

    /// How many days ahead of "now" busy data is fetched.
    pub horizon_days: u32,

    /// Daily slot layout.
    pub slot_window: SlotWindow,

    /// Zone the slot window is anchored in.
    pub window_anchor: WindowAnchor,

    /// Report Saturday and Sunday slots as closed.
    pub weekdays_only: bool,

    /// Event title prefix; the booker's name follows it.
    pub summary_prefix: String,

    /// Ask the calendar for a video conference on each event.
    pub request_conference: bool,

    /// Length limit of the CRM notes field, in characters.
    pub notes_limit: usize,

    /// Which end of the notes survives truncation.
    pub notes_truncation: NotesTruncation,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            owner_zone: ValidatedZone::new(Tz::Europe__London),
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            slot_window: SlotWindow::default(),
            window_anchor: WindowAnchor::default(),
            weekdays_only: true,
            summary_prefix: "Session with".to_string(),
            request_conference: true,
            notes_limit: DEFAULT_NOTES_LIMIT,
            notes_truncation: NotesTruncation::default(),
        }
    }
}

impl ServiceConfig {
    /// Creates a configuration for an owner in `zone`.
    pub fn new(zone: Tz) -> Self {
        Self {
            owner_zone: ValidatedZone::new(zone),
            ..Default::default()
        }
    }

    /// Builder: set the owner zone from an IANA identifier.
    ///
    /// Unlike viewer zones, the owner zone is never silently replaced by UTC.
    pub fn with_owner_timezone(mut self, identifier: &str) -> Result<Self, ZoneError> {
        self.owner_zone = ValidatedZone::new(parse_zone(identifier)?);
        Ok(self)
    }

    /// Builder: set the calendar id.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    /// Builder: set the availability horizon.
    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    /// Builder: set the slot window.
    pub fn with_slot_window(mut self, window: SlotWindow) -> Self {
        self.slot_window = window;
        self
    }

    /// Builder: set the window anchor.
    pub fn with_window_anchor(mut self, anchor: WindowAnchor) -> Self {
        self.window_anchor = anchor;
        self
    }

    /// Builder: open or close weekends.
    pub fn with_weekdays_only(mut self, weekdays_only: bool) -> Self {
        self.weekdays_only = weekdays_only;
        self
    }

    /// Builder: set the event title prefix.
    pub fn with_summary_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.summary_prefix = prefix.into();
        self
    }

    /// Builder: request conferencing on created events.
    pub fn with_conference(mut self, request_conference: bool) -> Self {
        self.request_conference = request_conference;
        self
    }

    /// Builder: set the notes limit and truncation policy.
    pub fn with_notes_limit(mut self, limit: usize, policy: NotesTruncation) -> Self {
        self.notes_limit = limit;
        self.notes_truncation = policy;
        self
    }

    /// Returns the zone slots are generated in for a given viewer.
    pub fn anchor_zone(&self, viewer: &ValidatedZone) -> ValidatedZone {
        match self.window_anchor {
            WindowAnchor::Owner => self.owner_zone,
            WindowAnchor::Viewer => *viewer,
        }
    }
}
