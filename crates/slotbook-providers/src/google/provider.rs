//! [`CalendarProvider`] implementation backed by the Google Calendar API.

use slotbook_core::{BusyInterval, TimeWindow};
use tracing::info;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarProvider, CreatedEvent, NewEvent};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;

const PROVIDER_NAME: &str = "google";

/// Google Calendar provider.
///
/// Holds a bearer token supplied by the caller. Without one the provider
/// reports itself unauthenticated and every call fails before touching the
/// network.
#[derive(Debug)]
pub struct GoogleProvider {
    client: Option<GoogleCalendarClient>,
}

impl GoogleProvider {
    /// Creates a provider from `config`.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|e| ProviderError::configuration(e).with_provider(PROVIDER_NAME))?;

        let client = match config.token() {
            Some(token) => {
                let token = token.to_string();
                Some(GoogleCalendarClient::new(token, config)?)
            }
            None => {
                info!("no Google access token configured");
                None
            }
        };

        Ok(Self { client })
    }

    fn client(&self) -> ProviderResult<&GoogleCalendarClient> {
        self.client.as_ref().ok_or_else(|| {
            ProviderError::authentication("no access token for the owner calendar")
                .with_provider(PROVIDER_NAME)
        })
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_authenticated(&self) -> bool {
        self.client.is_some()
    }

    fn query_free_busy(
        &self,
        calendar_id: &str,
        window: TimeWindow,
    ) -> BoxFuture<'_, ProviderResult<Vec<BusyInterval>>> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            self.client()?
                .free_busy(&calendar_id, window)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn create_event(
        &self,
        calendar_id: &str,
        event: NewEvent,
    ) -> BoxFuture<'_, ProviderResult<CreatedEvent>> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            self.client()?
                .insert_event(&calendar_id, &event)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn provider_with_token_is_authenticated() {
        let provider = GoogleProvider::new(GoogleConfig::new("ya29.token")).unwrap();
        assert_eq!(provider.name(), "google");
        assert!(provider.is_authenticated());
    }

    #[tokio::test]
    async fn provider_without_token_fails_fast() {
        let provider = GoogleProvider::new(GoogleConfig::default()).unwrap();
        assert!(!provider.is_authenticated());

        let err = provider
            .query_free_busy("primary", TimeWindow::horizon(Utc::now(), 30))
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.provider(), Some("google"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GoogleConfig::new("t").with_timeout(std::time::Duration::ZERO);
        let err = GoogleProvider::new(config).unwrap_err();
        assert_eq!(err.code(), crate::ProviderErrorCode::ConfigurationError);
    }
}
