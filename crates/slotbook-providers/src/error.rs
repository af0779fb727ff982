//! Errors raised at the calendar boundary.

use std::fmt;
use thiserror::Error;

/// The category of a calendar provider failure.
///
/// The server only distinguishes authentication failures from everything
/// else; the finer codes exist for logs and for retry decisions made by
/// callers outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// No credential, or the credential was rejected (401).
    AuthenticationFailed,
    /// The credential lacks access to the calendar (403).
    PermissionDenied,
    /// Connection, DNS or timeout failure.
    NetworkError,
    /// Too many requests (429).
    RateLimited,
    /// The calendar service failed (5xx).
    ServerError,
    /// The response body could not be understood.
    InvalidResponse,
    /// The calendar refused the request (4xx other than the above).
    Rejected,
    /// The provider is misconfigured.
    ConfigurationError,
    /// Unexpected internal state.
    InternalError,
}

impl ProviderErrorCode {
    /// Maps an HTTP status code to an error category.
    ///
    /// Returns `None` for success and redirect statuses.
    pub fn from_http_status(status: u16) -> Option<Self> {
        match status {
            100..=399 => None,
            401 => Some(Self::AuthenticationFailed),
            403 => Some(Self::PermissionDenied),
            429 => Some(Self::RateLimited),
            400..=499 => Some(Self::Rejected),
            _ => Some(Self::ServerError),
        }
    }

    /// Returns true if the failure is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns the snake_case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::PermissionDenied => "permission_denied",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::Rejected => "rejected",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by a [`CalendarProvider`](crate::CalendarProvider).
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Provider name (e.g. "google", "memory").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Rejected, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Sets the provider name.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true if the credential was missing or rejected.
    pub fn is_authentication(&self) -> bool {
        self.code == ProviderErrorCode::AuthenticationFailed
    }

    /// Returns true if this error is transient.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Returns a copy without the source chain.
    pub fn detached(&self) -> Self {
        Self {
            code: self.code,
            message: self.message.clone(),
            provider: self.provider.clone(),
            source: None,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(ProviderErrorCode::from_http_status(200), None);
        assert_eq!(
            ProviderErrorCode::from_http_status(401),
            Some(ProviderErrorCode::AuthenticationFailed)
        );
        assert_eq!(
            ProviderErrorCode::from_http_status(403),
            Some(ProviderErrorCode::PermissionDenied)
        );
        assert_eq!(
            ProviderErrorCode::from_http_status(409),
            Some(ProviderErrorCode::Rejected)
        );
        assert_eq!(
            ProviderErrorCode::from_http_status(429),
            Some(ProviderErrorCode::RateLimited)
        );
        assert_eq!(
            ProviderErrorCode::from_http_status(503),
            Some(ProviderErrorCode::ServerError)
        );
    }

    #[test]
    fn retryable_codes() {
        assert!(ProviderErrorCode::NetworkError.is_retryable());
        assert!(ProviderErrorCode::ServerError.is_retryable());
        assert!(!ProviderErrorCode::Rejected.is_retryable());
        assert!(!ProviderErrorCode::AuthenticationFailed.is_retryable());
    }

    #[test]
    fn display_includes_provider_and_code() {
        let err = ProviderError::rejected("slot conflicts").with_provider("google");
        assert_eq!(err.to_string(), "[google] rejected: slot conflicts");
        assert_eq!(err.provider(), Some("google"));
        assert!(!err.is_authentication());
    }

    #[test]
    fn detached_drops_source() {
        use std::error::Error;
        let err = ProviderError::network("connect failed")
            .with_source(std::io::Error::other("refused"));
        assert!(err.source().is_some());
        let copy = err.detached();
        assert!(copy.source().is_none());
        assert_eq!(copy.code(), ProviderErrorCode::NetworkError);
        assert_eq!(copy.message(), "connect failed");
    }
}
