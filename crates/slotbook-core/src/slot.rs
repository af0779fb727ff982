//! Fixed-duration candidate slots for a business day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::TimeWindow;
use crate::zone::ValidatedZone;

/// A bookable candidate interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Slot start (inclusive).
    pub start: DateTime<Utc>,
    /// Slot end (exclusive).
    pub end: DateTime<Utc>,
}

impl Slot {
    /// Returns the slot as a [`TimeWindow`].
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end,
        }
    }
}

/// The daily window slots are generated in.
///
/// `last_start` is the start time of the final slot, so the default window
/// (09:00 to 16:00, 30 minutes) yields 15 slots, the last ending at 16:30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    /// Wall-clock start of the first slot.
    pub first_start: NaiveTime,
    /// Wall-clock start of the last slot (inclusive).
    pub last_start: NaiveTime,
    /// Slot length in minutes.
    pub slot_minutes: u32,
}

impl Default for SlotWindow {
    fn default() -> Self {
        Self {
            first_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            last_start: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_minutes: 30,
        }
    }
}

impl SlotWindow {
    /// Creates a window from hour bounds and a slot length.
    ///
    /// Returns `None` if an hour is out of range.
    pub fn from_hours(first_hour: u32, last_hour: u32, slot_minutes: u32) -> Option<Self> {
        Some(Self {
            first_start: NaiveTime::from_hms_opt(first_hour, 0, 0)?,
            last_start: NaiveTime::from_hms_opt(last_hour, 0, 0)?,
            slot_minutes,
        })
    }

    /// Returns the constant slot duration.
    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    /// Returns the wall-clock start time of every slot, in order.
    pub fn start_times(&self) -> Vec<NaiveTime> {
        let mut times = Vec::new();
        if self.slot_minutes == 0 {
            return times;
        }

        let step = self.slot_duration();
        let mut current = self.first_start;
        while current <= self.last_start {
            times.push(current);
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            current = next;
        }
        times
    }

    /// Generates the slots for `date`, anchored to the wall clock of `zone`.
    ///
    /// Start times are resolved through the zone database; each end is the
    /// start plus the fixed duration, so every slot has the same length even
    /// on DST transition days.
    pub fn generate(&self, date: NaiveDate, zone: &ValidatedZone) -> Vec<Slot> {
        let duration = self.slot_duration();
        self.start_times()
            .into_iter()
            .map(|time| {
                let start = zone.from_wall_clock(date.and_time(time));
                Slot {
                    start,
                    end: start + duration,
                }
            })
            .collect()
    }

    /// Returns the wall-clock label (`HH:MM`) of every slot.
    pub fn labels(&self) -> Vec<String> {
        self.start_times()
            .into_iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect()
    }
}
