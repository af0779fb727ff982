//! Configuration commands.

use std::path::Path;

use crate::config::{CalendarBackend, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Dump the current configuration to stdout. Secret references are shown
/// as written; literal tokens are masked.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let mut shown = config.clone();
    if let Some(google) = shown.google.as_mut() {
        if let Some(token) = google.access_token.as_mut() {
            if !secret::is_reference(token) {
                *token = "********".to_string();
            }
        }
    }
    let toml_str = toml::to_string_pretty(&shown)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.to_service_config()?;

    for entry in &config.calendar.busy {
        if entry.to_interval().is_none() {
            return Err(ClientError::Config(format!(
                "busy entry ends before it starts: {} .. {}",
                entry.start, entry.end
            )));
        }
    }

    if config.calendar.backend == CalendarBackend::Google {
        let google = config.google.as_ref().ok_or_else(|| {
            ClientError::Config("calendar backend is \"google\" but [google] is missing".into())
        })?;
        google
            .resolve_token()
            .map_err(|e| ClientError::Config(format!("invalid Google settings: {}", e)))?;
        println!("Google access token resolved.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration and contact file paths.
pub fn path(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    println!("contacts: {}", config.crm.path().display());
    Ok(())
}
