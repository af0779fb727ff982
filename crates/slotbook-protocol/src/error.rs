//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding a body.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Body exceeds the maximum allowed size.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Body is not a valid message.
    #[error("invalid message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading the body failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Body is empty.
    #[error("empty message")]
    EmptyMessage,
}
