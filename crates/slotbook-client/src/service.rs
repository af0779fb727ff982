//! Builds the booking services from the client configuration.

use std::sync::Arc;

use slotbook_providers::{CalendarProvider, CrmStore, JsonFileCrmStore, MemoryCalendar};
use slotbook_server::RequestHandler;
use tracing::{debug, info, warn};

use crate::config::{CalendarBackend, ClientConfig};
use crate::error::{ClientError, ClientResult};

/// Creates a request handler for the configured calendar and contact file.
pub fn build_handler(config: &ClientConfig) -> ClientResult<RequestHandler> {
    let service = config.to_service_config()?;
    let calendar = build_calendar(config)?;
    let crm = build_crm(config);
    Ok(RequestHandler::new(service, calendar, crm))
}

fn build_calendar(config: &ClientConfig) -> ClientResult<Arc<dyn CalendarProvider>> {
    match config.calendar.backend {
        CalendarBackend::Memory => {
            let calendar_id = &config.owner.calendar_id;
            let mut calendar = MemoryCalendar::new();
            for entry in &config.calendar.busy {
                match entry.to_interval() {
                    Some(busy) => calendar = calendar.with_busy(calendar_id.clone(), busy),
                    None => warn!(start = %entry.start, end = %entry.end, "Ignoring empty busy entry"),
                }
            }
            debug!(busy = config.calendar.busy.len(), "Using in-memory calendar");
            Ok(Arc::new(calendar))
        }
        CalendarBackend::Google => build_google(config),
    }
}

#[cfg(feature = "google")]
fn build_google(config: &ClientConfig) -> ClientResult<Arc<dyn CalendarProvider>> {
    let settings = config.google.as_ref().ok_or_else(|| {
        ClientError::Config("calendar backend is \"google\" but [google] is missing".into())
    })?;
    let google_config = settings
        .to_provider_config()
        .map_err(|e| ClientError::Config(format!("invalid Google configuration: {}", e)))?;
    let provider = slotbook_providers::google::GoogleProvider::new(google_config)?;
    if provider.is_authenticated() {
        info!("Google Calendar provider initialized (authenticated)");
    } else {
        warn!("Google Calendar provider initialized but not authenticated");
    }
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "google"))]
fn build_google(_config: &ClientConfig) -> ClientResult<Arc<dyn CalendarProvider>> {
    Err(ClientError::Config(
        "this build does not include Google Calendar support".into(),
    ))
}

fn build_crm(config: &ClientConfig) -> Arc<dyn CrmStore> {
    let path = config.crm.path();
    debug!(path = %path.display(), "Using contact file");
    Arc::new(JsonFileCrmStore::new(path))
}
