//! Google Calendar provider configuration.

use std::time::Duration;

use url::Url;

/// Base URL for Google Calendar API v3.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Configuration for the Google Calendar provider.
///
/// Acquiring the access token (OAuth consent, service-account delegation) is
/// left to the caller; the provider only presents it.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Bearer token for the owner's calendar. `None` leaves the provider
    /// unauthenticated.
    pub access_token: Option<String>,

    /// API root, overridable for tests and proxies.
    pub api_base: Url,

    /// Request timeout applied to every call.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: default_api_base(),
            timeout: Duration::from_secs(30),
            user_agent: format!("slotbook/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn default_api_base() -> Url {
    Url::parse(DEFAULT_API_BASE).expect("Invalid default API base URL")
}

impl GoogleConfig {
    /// Creates a configuration carrying `access_token`.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    /// Sets the API root.
    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the token if it is present and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero");
        }
        if !matches!(self.api_base.scheme(), "http" | "https") {
            return Err("api_base must be an http(s) URL");
        }
        Ok(())
    }

    /// Joins `path` onto the API root.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.as_str().trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GoogleConfig::default();
        assert_eq!(config.api_base.as_str(), "https://www.googleapis.com/calendar/v3");
        assert!(config.token().is_none());
        assert!(config.user_agent.starts_with("slotbook/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_token_is_absent() {
        assert!(GoogleConfig::new("  ").token().is_none());
        assert_eq!(GoogleConfig::new("ya29.abc").token(), Some("ya29.abc"));
    }

    #[test]
    fn validation() {
        let config = GoogleConfig::new("t").with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = GoogleConfig::new("t").with_api_base(Url::parse("ftp://example.com").unwrap());
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoint_joins_paths() {
        let config = GoogleConfig::default()
            .with_api_base(Url::parse("http://127.0.0.1:9000/calendar/v3/").unwrap());
        assert_eq!(
            config.endpoint("freeBusy"),
            "http://127.0.0.1:9000/calendar/v3/freeBusy"
        );
    }
}
