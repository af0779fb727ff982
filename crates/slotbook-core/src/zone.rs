//! Timezone validation and instant/wall-clock conversion.
//!
//! All interval math in slotbook happens on UTC instants. This module is the
//! only place where a zone-local wall-clock value is produced or consumed:
//!
//! - [`validate`] turns an arbitrary identifier into a [`ValidatedZone`],
//!   falling back to UTC instead of failing.
//! - [`to_zone`] renders an instant as the wall-clock time of a zone.
//! - [`from_wall_clock`] resolves a wall-clock time in a zone back to an
//!   instant, absorbing DST gaps and folds.
//!
//! Conversions use the IANA database shipped with `chrono-tz`, never fixed
//! offsets, so zones that observe daylight saving are handled correctly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::warn;

/// Errors produced when resolving a timezone identifier.
///
/// These never escape [`validate`]; they exist for callers that want to know
/// *why* a zone fell back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// The identifier is empty or whitespace.
    #[error("timezone identifier is empty")]
    Empty,

    /// The identifier is not in the IANA database.
    #[error("unknown timezone identifier: {0}")]
    Unknown(String),
}

/// Parses an IANA identifier strictly.
pub fn parse_zone(identifier: &str) -> Result<Tz, ZoneError> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Err(ZoneError::Empty);
    }
    Tz::from_str(trimmed).map_err(|_| ZoneError::Unknown(trimmed.to_string()))
}

/// A timezone that has been checked against the IANA database.
///
/// If the requested identifier was not recognised, the zone is UTC and
/// [`is_fallback`](Self::is_fallback) returns `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidatedZone {
    tz: Tz,
    fallback: bool,
}

impl ValidatedZone {
    /// The canonical fallback zone.
    pub const UTC: Self = Self {
        tz: Tz::UTC,
        fallback: false,
    };

    /// Wraps an already-parsed zone.
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            fallback: false,
        }
    }

    fn fallback() -> Self {
        Self {
            tz: Tz::UTC,
            fallback: true,
        }
    }

    /// Returns the underlying `chrono-tz` zone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Returns the IANA name of the zone (e.g. `Europe/London`).
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// Returns `true` if the requested identifier was rejected and this zone
    /// is the UTC fallback.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Returns the instant as a zoned datetime.
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Returns the wall-clock representation of the instant in this zone.
    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        self.to_local(instant).naive_local()
    }

    /// Resolves a wall-clock time in this zone to an instant.
    ///
    /// Ambiguous times (DST fold) resolve to the earlier instant. Times that
    /// do not exist (DST gap) are pushed forward past the gap.
    pub fn from_wall_clock(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => {
                let shifted = local + Duration::hours(1);
                self.tz
                    .from_local_datetime(&shifted)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| local.and_utc())
            }
        }
    }

    /// Returns the short zone label in effect at the given instant
    /// (e.g. `GMT`, `BST`, `JST`).
    pub fn abbreviation(&self, at: DateTime<Utc>) -> String {
        self.to_local(at).format("%Z").to_string()
    }
}

impl Default for ValidatedZone {
    fn default() -> Self {
        Self::UTC
    }
}

impl fmt::Display for ValidatedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validates a timezone identifier, degrading to UTC when it is not
/// recognised. Never fails.
pub fn validate(identifier: &str) -> ValidatedZone {
    match parse_zone(identifier) {
        Ok(tz) => ValidatedZone::new(tz),
        Err(e) => {
            warn!(identifier = %identifier, error = %e, "falling back to UTC");
            ValidatedZone::fallback()
        }
    }
}

/// Renders `instant` as the wall-clock time of `zone`.
pub fn to_zone(instant: DateTime<Utc>, zone: &ValidatedZone) -> NaiveDateTime {
    zone.wall_clock(instant)
}

/// Resolves a wall-clock time in `zone` to an instant.
pub fn from_wall_clock(local: NaiveDateTime, zone: &ValidatedZone) -> DateTime<Utc> {
    zone.from_wall_clock(local)
}

/// Returns `true` if the wall-clock time occurs twice in `zone`.
pub fn is_ambiguous(local: NaiveDateTime, zone: &ValidatedZone) -> bool {
    matches!(
        zone.tz.from_local_datetime(&local),
        LocalResult::Ambiguous(_, _)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn validate_known_zone() {
        let zone = validate("Asia/Tokyo");
        assert_eq!(zone.name(), "Asia/Tokyo");
        assert!(!zone.is_fallback());
    }

    #[test]
    fn validate_trims_whitespace() {
        assert_eq!(validate("  Europe/London ").name(), "Europe/London");
    }

    #[test]
    fn validate_unknown_falls_back_to_utc() {
        let zone = validate("not-a-real-zone");
        assert_eq!(zone.name(), "UTC");
        assert!(zone.is_fallback());

        let zone = validate("");
        assert_eq!(zone.tz(), Tz::UTC);
        assert!(zone.is_fallback());
    }

    #[test]
    fn parse_zone_errors() {
        assert_eq!(parse_zone("   "), Err(ZoneError::Empty));
        assert_eq!(
            parse_zone("Mars/Olympus"),
            Err(ZoneError::Unknown("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn to_zone_observes_dst() {
        let london = validate("Europe/London");
        // Winter: GMT
        assert_eq!(to_zone(utc(2024, 1, 15, 12, 0), &london), naive(2024, 1, 15, 12, 0));
        // Summer: BST
        assert_eq!(to_zone(utc(2024, 7, 15, 12, 0), &london), naive(2024, 7, 15, 13, 0));
    }

    #[test]
    fn from_wall_clock_handles_gap() {
        let london = validate("Europe/London");
        // 01:30 on 2024-03-31 does not exist in London; pushed to 02:30 BST.
        let instant = from_wall_clock(naive(2024, 3, 31, 1, 30), &london);
        assert_eq!(instant, utc(2024, 3, 31, 1, 30));
        assert_eq!(to_zone(instant, &london), naive(2024, 3, 31, 2, 30));
    }

    #[test]
    fn from_wall_clock_picks_earliest_in_fold() {
        let london = validate("Europe/London");
        let local = naive(2024, 10, 27, 1, 30);
        assert!(is_ambiguous(local, &london));
        // First occurrence is still BST (UTC+1).
        assert_eq!(from_wall_clock(local, &london), utc(2024, 10, 27, 0, 30));
    }

    #[test]
    fn round_trip_outside_folds() {
        for name in ["Europe/London", "America/New_York", "Asia/Tokyo", "UTC"] {
            let zone = validate(name);
            let mut t = utc(2024, 1, 1, 0, 0);
            let end = utc(2025, 1, 1, 0, 0);
            while t < end {
                let local = to_zone(t, &zone);
                if !is_ambiguous(local, &zone) {
                    assert_eq!(from_wall_clock(local, &zone), t, "{name} at {t}");
                }
                t += Duration::minutes(337);
            }
        }
    }

    #[test]
    fn abbreviation_tracks_offset() {
        let london = validate("Europe/London");
        assert_eq!(london.abbreviation(utc(2024, 1, 10, 9, 0)), "GMT");
        assert_eq!(london.abbreviation(utc(2024, 7, 10, 9, 0)), "BST");
        assert_eq!(validate("Asia/Tokyo").abbreviation(utc(2024, 7, 10, 9, 0)), "JST");
    }
}
