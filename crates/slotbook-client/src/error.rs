//! Client error types.

use std::fmt;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Provider or contact store setup failed.
    Provider(String),
    /// IO error.
    Io(std::io::Error),
    /// Request body could not be read or written.
    Protocol(slotbook_protocol::ProtocolError),
    /// The service answered with an error or a failed booking.
    Rejected(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Protocol(err) => write!(f, "protocol error: {}", err),
            Self::Rejected(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<slotbook_protocol::ProtocolError> for ClientError {
    fn from(err: slotbook_protocol::ProtocolError) -> Self {
        Self::Protocol(err)
    }
}

impl From<slotbook_providers::ProviderError> for ClientError {
    fn from(err: slotbook_providers::ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}
