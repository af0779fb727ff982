//! Service error types.

use slotbook_core::ValidationError;
use slotbook_protocol::ErrorCode;
use slotbook_providers::{ProviderError, StoreError};
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that fail an availability query or a booking.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed request fields.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// No valid credential for the owner's calendar.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The calendar was unreachable or refused the operation.
    #[error("Calendar provider error: {0}")]
    Provider(ProviderError),
}

impl ServiceError {
    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Returns the caller-visible error category.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::InvalidRequest,
            Self::Authentication(_) => ErrorCode::AuthenticationFailed,
            Self::Provider(_) => ErrorCode::ProviderError,
        }
    }
}

impl From<ProviderError> for ServiceError {
    fn from(error: ProviderError) -> Self {
        if error.is_authentication() {
            Self::Authentication(error.message().to_string())
        } else {
            Self::Provider(error)
        }
    }
}

/// Failures inside the detached CRM sync. Logged, never returned to the
/// booking caller.
#[derive(Debug, Error)]
pub enum CrmSyncError {
    /// Looking the contact up failed.
    #[error("contact lookup failed: {0}")]
    Lookup(#[source] StoreError),

    /// Creating a new contact failed.
    #[error("contact creation failed: {0}")]
    Create(#[source] StoreError),

    /// Writing merged notes failed.
    #[error("notes update failed: {0}")]
    Update(#[source] StoreError),
}
