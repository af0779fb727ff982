//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/slotbook/config.toml` by default.
//!
//! ```toml
//! [owner]
//! timezone = "Europe/London"
//!
//! [calendar]
//! backend = "google"
//!
//! [google]
//! access_token = "env::GOOGLE_ACCESS_TOKEN"
//! ```
//!
//! The access token supports secret references (see [`crate::secret`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use slotbook_core::{BusyInterval, DEFAULT_NOTES_LIMIT, NotesTruncation, SlotWindow};
use slotbook_server::{ServiceConfig, WindowAnchor};

use crate::error::{ClientError, ClientResult};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the slotbook client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Calendar owner settings.
    pub owner: OwnerSettings,

    /// Slot layout.
    pub slots: SlotSettings,

    /// Event creation settings.
    pub booking: BookingSettings,

    /// Calendar backend selection.
    pub calendar: CalendarSettings,

    /// Contact store settings.
    pub crm: CrmSettings,

    /// Google Calendar settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleSettings>,
}

/// Calendar owner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerSettings {
    /// IANA zone of the owner.
    pub timezone: String,

    /// Calendar to read and write.
    pub calendar_id: String,
}

impl Default for OwnerSettings {
    fn default() -> Self {
        Self {
            timezone: "Europe/London".to_string(),
            calendar_id: "primary".to_string(),
        }
    }
}

/// Daily slot layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotSettings {
    /// Hour of the first slot start.
    pub first_hour: u32,

    /// Hour of the last slot start.
    pub last_hour: u32,

    /// Slot length in minutes.
    pub slot_minutes: u32,

    /// Close Saturdays and Sundays.
    pub weekdays_only: bool,

    /// Whose wall clock the window follows.
    pub anchor: WindowAnchor,

    /// Days of busy data fetched ahead.
    pub horizon_days: u32,
}

impl Default for SlotSettings {
    fn default() -> Self {
        Self {
            first_hour: 9,
            last_hour: 16,
            slot_minutes: 30,
            weekdays_only: true,
            anchor: WindowAnchor::Owner,
            horizon_days: 30,
        }
    }
}

/// Event creation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Event title prefix.
    pub summary_prefix: String,

    /// Attach a video conference to each event.
    pub conference: bool,

    /// Seconds to wait for the CRM sync before exiting.
    pub crm_grace_secs: u64,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            summary_prefix: "Session with".to_string(),
            conference: true,
            crm_grace_secs: 5,
        }
    }
}

impl BookingSettings {
    /// Returns the CRM grace period.
    pub fn crm_grace(&self) -> Duration {
        Duration::from_secs(self.crm_grace_secs)
    }
}

/// Which calendar implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarBackend {
    /// An in-process calendar seeded from `[[calendar.busy]]`.
    #[default]
    Memory,
    /// Google Calendar, configured in `[google]`.
    Google,
}

/// Calendar backend settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Backend.
    pub backend: CalendarBackend,

    /// Busy periods for the memory backend.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub busy: Vec<BusyEntry>,
}

/// A busy period, RFC 3339 bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyEntry {
    /// Start (inclusive).
    pub start: DateTime<FixedOffset>,
    /// End (exclusive).
    pub end: DateTime<FixedOffset>,
}

impl BusyEntry {
    /// Converts to a busy interval; `None` if the entry is empty.
    pub fn to_interval(&self) -> Option<BusyInterval> {
        BusyInterval::from_offsets(self.start, self.end)
    }
}

/// Contact store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmSettings {
    /// Contact file. Defaults to `contacts.json` in the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Notes field limit in characters.
    pub notes_limit: usize,

    /// Which end of the notes survives truncation.
    pub truncation: NotesTruncation,
}

impl Default for CrmSettings {
    fn default() -> Self {
        Self {
            path: None,
            notes_limit: DEFAULT_NOTES_LIMIT,
            truncation: NotesTruncation::default(),
        }
    }
}

impl CrmSettings {
    /// Returns the contact file path.
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| ClientConfig::default_data_dir().join("contacts.json"))
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slotbook")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slotbook")
    }

    /// Builds the service configuration.
    pub fn to_service_config(&self) -> ClientResult<ServiceConfig> {
        let slot_window = SlotWindow::from_hours(
            self.slots.first_hour,
            self.slots.last_hour,
            self.slots.slot_minutes,
        )
        .filter(|w| w.slot_minutes > 0 && w.first_start <= w.last_start)
        .ok_or_else(|| {
            ClientError::Config(format!(
                "invalid slot window {}:00-{}:00 every {} minutes",
                self.slots.first_hour, self.slots.last_hour, self.slots.slot_minutes
            ))
        })?;

        let config = ServiceConfig::default()
            .with_owner_timezone(&self.owner.timezone)
            .map_err(|e| ClientError::Config(format!("invalid owner timezone: {}", e)))?
            .with_calendar_id(self.owner.calendar_id.clone())
            .with_horizon_days(self.slots.horizon_days)
            .with_slot_window(slot_window)
            .with_window_anchor(self.slots.anchor)
            .with_weekdays_only(self.slots.weekdays_only)
            .with_summary_prefix(self.booking.summary_prefix.clone())
            .with_conference(self.booking.conference)
            .with_notes_limit(self.crm.notes_limit, self.crm.truncation);
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// GoogleSettings (in config.toml)
// ---------------------------------------------------------------------------

/// Google Calendar settings.
///
/// The access token is obtained elsewhere (OAuth consent or a service
/// account) and supports `pass::` and `env::` references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// Bearer token.
    pub access_token: Option<String>,

    /// API root override.
    pub api_base: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl GoogleSettings {
    /// Resolves the access token, expanding secret references.
    pub fn resolve_token(&self) -> Result<String, String> {
        let raw = self.access_token.as_deref().ok_or_else(|| {
            format!(
                "Google access token not found. Add to {}:\n  \
                 [google]\n  \
                 access_token = \"env::GOOGLE_ACCESS_TOKEN\"",
                ClientConfig::default_path().display()
            )
        })?;
        crate::secret::resolve(raw).map_err(|e| format!("failed to resolve access_token: {}", e))
    }

    /// Converts to provider configuration.
    #[cfg(feature = "google")]
    pub fn to_provider_config(
        &self,
    ) -> Result<slotbook_providers::google::GoogleConfig, String> {
        use slotbook_providers::google::GoogleConfig;

        let mut config = GoogleConfig::new(self.resolve_token()?);
        if let Some(ref base) = self.api_base {
            let url = url::Url::parse(base).map_err(|e| format!("invalid api_base: {}", e))?;
            config = config.with_api_base(url);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.owner.timezone, "Europe/London");
        assert_eq!(config.calendar.backend, CalendarBackend::Memory);
        assert!(config.google.is_none());

        let service = config.to_service_config().unwrap();
        assert_eq!(service.owner_zone.name(), "Europe/London");
        assert_eq!(service.slot_window, SlotWindow::default());
    }

    #[test]
    fn full_file() {
        let toml_content = r#"
[owner]
timezone = "America/New_York"
calendar_id = "owner@example.com"

[slots]
first_hour = 10
last_hour = 12
anchor = "viewer"
weekdays_only = false

[booking]
conference = false

[crm]
path = "/tmp/contacts.json"
notes_limit = 100
truncation = "keep_oldest"

[calendar]
backend = "memory"

[[calendar.busy]]
start = "2024-03-12T10:00:00-04:00"
end = "2024-03-12T11:00:00-04:00"
"#;
        let config: ClientConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.calendar.busy.len(), 1);
        assert!(config.calendar.busy[0].to_interval().is_some());
        assert_eq!(config.crm.path(), PathBuf::from("/tmp/contacts.json"));

        let service = config.to_service_config().unwrap();
        assert_eq!(service.owner_zone.name(), "America/New_York");
        assert_eq!(service.calendar_id, "owner@example.com");
        assert_eq!(service.slot_window.start_times().len(), 5);
        assert_eq!(service.window_anchor, WindowAnchor::Viewer);
        assert!(!service.weekdays_only);
        assert!(!service.request_conference);
        assert_eq!(service.notes_limit, 100);
        assert_eq!(service.notes_truncation, NotesTruncation::KeepOldest);
    }

    #[test]
    fn bad_owner_timezone_is_rejected() {
        let config: ClientConfig = toml::from_str("[owner]\ntimezone = \"Nowhere/Land\"\n").unwrap();
        let err = config.to_service_config().unwrap_err();
        assert!(err.to_string().contains("owner timezone"));
    }

    #[test]
    fn bad_slot_window_is_rejected() {
        let config: ClientConfig =
            toml::from_str("[slots]\nfirst_hour = 17\nlast_hour = 9\n").unwrap();
        assert!(matches!(
            config.to_service_config(),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn token_env_reference() {
        unsafe {
            std::env::set_var("_SLOTBOOK_CFG_TOKEN", "tok-123");
        }
        let config: ClientConfig =
            toml::from_str("[google]\naccess_token = \"env::_SLOTBOOK_CFG_TOKEN\"\n").unwrap();
        let google = config.google.unwrap();
        assert_eq!(google.resolve_token().unwrap(), "tok-123");
        unsafe {
            std::env::remove_var("_SLOTBOOK_CFG_TOKEN");
        }
    }

    #[test]
    fn missing_token_explains_itself() {
        let err = GoogleSettings::default().resolve_token().unwrap_err();
        assert!(err.contains("access_token"));
    }

    #[test]
    fn dump_round_trips() {
        let config = ClientConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.owner.timezone, config.owner.timezone);
        assert_eq!(parsed.slots.last_hour, 16);
    }
}
