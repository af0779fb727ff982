//! Availability queries.
//!
//! The engine fetches busy intervals once per query, classifies every
//! generated slot in instant space, and only then renders the slot bounds in
//! the viewer's zone.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use slotbook_core::{
    BusyInterval, Slot, SlotStatus, TimeWindow, ValidatedZone, classify, relevant_busy, validate,
};
use slotbook_protocol::{AvailabilityView, SlotView};
use slotbook_providers::CalendarProvider;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// One slot with its verdict and viewer-local bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotVerdict {
    /// The slot, in instants.
    pub slot: Slot,
    /// Verdict reached on instants.
    pub status: SlotStatus,
    /// Start as seen by the viewer.
    pub display_start: DateTime<Tz>,
    /// End as seen by the viewer.
    pub display_end: DateTime<Tz>,
}

impl SlotVerdict {
    /// Returns `true` if the slot can be booked.
    pub fn available(&self) -> bool {
        self.status.is_available()
    }

    fn to_view(&self) -> SlotView {
        SlotView {
            start: self.display_start.to_rfc3339(),
            end: self.display_end.to_rfc3339(),
            label: self.display_start.format("%H:%M").to_string(),
            available: self.available(),
            status: self.status,
        }
    }
}

/// The result of one availability query.
#[derive(Debug, Clone)]
pub struct AvailabilityReport {
    /// Requested date.
    pub date: NaiveDate,
    /// Resolved viewer zone.
    pub viewer: ValidatedZone,
    /// Owner zone.
    pub owner: ValidatedZone,
    /// Slots in start order.
    pub verdicts: Vec<SlotVerdict>,
}

impl AvailabilityReport {
    /// Returns the bookable slots.
    pub fn available(&self) -> impl Iterator<Item = &SlotVerdict> {
        self.verdicts.iter().filter(|v| v.available())
    }

    /// Converts the report to its wire form.
    pub fn to_view(&self) -> AvailabilityView {
        let reference = self
            .verdicts
            .first()
            .map(|v| v.slot.start)
            .unwrap_or_else(|| TimeWindow::for_date(self.date, &self.viewer).start);
        AvailabilityView {
            date: self.date,
            viewer_timezone: self.viewer.name().to_string(),
            viewer_zone_abbreviation: self.viewer.abbreviation(reference),
            owner_timezone: self.owner.name().to_string(),
            slots: self.verdicts.iter().map(SlotVerdict::to_view).collect(),
        }
    }
}

/// Computes slot availability from the owner's calendar.
pub struct AvailabilityEngine {
    config: Arc<ServiceConfig>,
    calendar: Arc<dyn CalendarProvider>,
}

impl AvailabilityEngine {
    /// Creates an engine over `calendar`.
    pub fn new(config: Arc<ServiceConfig>, calendar: Arc<dyn CalendarProvider>) -> Self {
        Self { config, calendar }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Queries availability for `date` as seen from `viewer_timezone`.
    ///
    /// An unknown viewer zone degrades to UTC. A calendar failure is
    /// returned as an error; the day is never reported free without busy
    /// data.
    pub async fn query(
        &self,
        date: NaiveDate,
        viewer_timezone: &str,
    ) -> ServiceResult<AvailabilityReport> {
        self.query_at(date, viewer_timezone, Utc::now()).await
    }

    /// Like [`query`](Self::query), evaluated at a fixed `now`.
    pub async fn query_at(
        &self,
        date: NaiveDate,
        viewer_timezone: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<AvailabilityReport> {
        if !self.calendar.is_authenticated() {
            return Err(ServiceError::authentication(format!(
                "calendar provider '{}' has no valid credential",
                self.calendar.name()
            )));
        }

        let viewer = validate(viewer_timezone);
        let anchor = self.config.anchor_zone(&viewer);
        let slots = self.config.slot_window.generate(date, &anchor);

        let window = query_window(now, self.config.horizon_days, date, &anchor);

        let busy = self
            .calendar
            .query_free_busy(&self.config.calendar_id, window)
            .await
            .map_err(|e| {
                warn!(
                    provider = %self.calendar.name(),
                    error = %e,
                    "Free/busy query failed"
                );
                ServiceError::from(e)
            })?;

        let busy = match slots_span(&slots) {
            Some(span) => relevant_busy(&busy, &span),
            None => Vec::new(),
        };
        let open = !self.config.weekdays_only || is_weekday(date);

        debug!(
            %date,
            viewer = viewer.name(),
            anchor = anchor.name(),
            busy_count = busy.len(),
            open,
            "Evaluating slots"
        );

        let verdicts = slots
            .into_iter()
            .map(|slot| evaluate(slot, &busy, now, open, &viewer))
            .collect();

        Ok(AvailabilityReport {
            date,
            viewer,
            owner: self.config.owner_zone,
            verdicts,
        })
    }
}

/// The single free/busy read for one query: the horizon when it holds the
/// whole requested day, otherwise just that day. Never longer than the
/// horizon or one local day.
fn query_window(
    now: DateTime<Utc>,
    horizon_days: u32,
    date: NaiveDate,
    anchor: &ValidatedZone,
) -> TimeWindow {
    let horizon = TimeWindow::horizon(now, horizon_days);
    let day = TimeWindow::for_date(date, anchor);
    if horizon.covers(&day) { horizon } else { day }
}

fn evaluate(
    slot: Slot,
    busy: &[BusyInterval],
    now: DateTime<Utc>,
    open: bool,
    viewer: &ValidatedZone,
) -> SlotVerdict {
    let status = classify(&slot, busy, now, open);
    SlotVerdict {
        status,
        display_start: viewer.to_local(slot.start),
        display_end: viewer.to_local(slot.end),
        slot,
    }
}

fn slots_span(slots: &[Slot]) -> Option<TimeWindow> {
    slots
        .iter()
        .map(Slot::window)
        .reduce(|acc, window| acc.union(&window))
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
