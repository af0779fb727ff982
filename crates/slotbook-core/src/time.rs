//! Half-open instant intervals.
//!
//! [`TimeWindow`] is the building block for busy intervals, slots and query
//! horizons. It always holds UTC instants; zone-local values only appear at
//! the edges (see [`crate::zone`]).

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::zone::ValidatedZone;

/// A half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window, returning `None` when `start` is after `end`.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Creates a time window from a start time and duration.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// Returns the window covering one calendar day of `zone`.
    ///
    /// The day is 23 or 25 hours long on DST transition dates.
    pub fn for_date(date: NaiveDate, zone: &ValidatedZone) -> Self {
        let start = zone.from_wall_clock(date.and_time(NaiveTime::MIN));
        let end = match date.succ_opt() {
            Some(next) => zone.from_wall_clock(next.and_time(NaiveTime::MIN)),
            None => start + Duration::days(1),
        };
        Self { start, end }
    }

    /// Returns the availability horizon: `days` whole days starting at `now`.
    pub fn horizon(now: DateTime<Utc>, days: u32) -> Self {
        Self::new(now, now + Duration::days(i64::from(days)))
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns `true` if the window has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Checks if a datetime falls within this window.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if this window fully covers `other`.
    pub fn covers(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Half-open overlap test.
    ///
    /// Windows that merely touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Returns the smallest window covering both `self` and `other`.
    pub fn union(&self, other: &TimeWindow) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
