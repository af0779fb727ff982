//! Free/busy verdicts for generated slots.
//!
//! Everything here compares UTC instants. Display conversion happens after a
//! verdict is reached and never feeds back into it.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::slot::Slot;
use crate::time::TimeWindow;

/// A busy period reported by the calendar, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusyInterval {
    /// Start of the busy period (inclusive).
    pub start: DateTime<Utc>,
    /// End of the busy period (exclusive).
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    /// Creates a busy interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Normalises bounds expressed with a fixed offset (as calendar APIs
    /// return them) into instants.
    pub fn from_offsets(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Option<Self> {
        Self::new(start.with_timezone(&Utc), end.with_timezone(&Utc))
    }

    /// Returns the interval as a [`TimeWindow`].
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end,
        }
    }
}

/// Returns `true` if the slot and the busy interval overlap.
pub fn conflicts(slot: &Slot, busy: &BusyInterval) -> bool {
    slot.window().overlaps(&busy.window())
}

/// A slot is available iff it conflicts with none of the busy intervals.
pub fn is_available(slot: &Slot, busy: &[BusyInterval]) -> bool {
    !busy.iter().any(|b| conflicts(slot, b))
}

/// Why a slot can or cannot be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Bookable.
    Free,
    /// Overlaps a busy interval.
    Busy,
    /// Starts at or before the evaluation instant.
    Past,
    /// Falls on a day bookings are not taken.
    Closed,
}

impl SlotStatus {
    /// Returns `true` for [`SlotStatus::Free`].
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Classifies a slot. Closed days win over past slots, which win over busy.
pub fn classify(slot: &Slot, busy: &[BusyInterval], now: DateTime<Utc>, open: bool) -> SlotStatus {
    if !open {
        SlotStatus::Closed
    } else if slot.start <= now {
        SlotStatus::Past
    } else if is_available(slot, busy) {
        SlotStatus::Free
    } else {
        SlotStatus::Busy
    }
}

/// Keeps only the busy intervals that can affect anything inside `window`,
/// sorted by start.
pub fn relevant_busy(busy: &[BusyInterval], window: &TimeWindow) -> Vec<BusyInterval> {
    let mut relevant: Vec<_> = busy
        .iter()
        .filter(|b| b.window().overlaps(window))
        .copied()
        .collect();
    relevant.sort_by_key(|b| b.start);
    relevant
}
