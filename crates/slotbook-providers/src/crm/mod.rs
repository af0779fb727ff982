//! CRM contact stores.
//!
//! A [`CrmStore`] keeps one [`ContactRecord`] per email address. Booking
//! mirrors each reservation into it on a best-effort basis, so nothing
//! here can fail a booking.

mod file;
mod memory;

use std::path::PathBuf;

use slotbook_core::{ContactRecord, StoredContact};
use thiserror::Error;

use crate::provider::BoxFuture;

pub use file::JsonFileCrmStore;
pub use memory::MemoryCrmStore;

/// Errors raised by a contact store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached.
    #[error("contact store unavailable: {0}")]
    Unavailable(String),

    /// No contact has the given id.
    #[error("contact not found: {0}")]
    NotFound(String),

    /// A contact with this email already exists.
    #[error("contact already exists for {0}")]
    DuplicateEmail(String),

    /// Reading or writing the backing file failed.
    #[error("contact store I/O error at {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not valid JSON.
    #[error("contact store is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// A specialized Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Contact storage keyed by email.
pub trait CrmStore: Send + Sync {
    /// Returns the store name used in logs.
    fn name(&self) -> &str;

    /// Looks up a contact by exact email match.
    fn find_by_email(&self, email: &str) -> BoxFuture<'_, StoreResult<Option<StoredContact>>>;

    /// Inserts a new contact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEmail`] if the email is already present.
    fn create_contact(&self, record: ContactRecord) -> BoxFuture<'_, StoreResult<StoredContact>>;

    /// Replaces the notes of contact `id`.
    fn update_notes(&self, id: &str, text: String) -> BoxFuture<'_, StoreResult<()>>;
}

/// A store that is never reachable.
#[derive(Debug, Clone)]
pub struct UnavailableCrmStore {
    reason: String,
}

impl UnavailableCrmStore {
    /// Creates a store failing every call with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T: Send + 'static>(&self) -> BoxFuture<'_, StoreResult<T>> {
        let error = StoreError::Unavailable(self.reason.clone());
        Box::pin(async move { Err(error) })
    }
}

impl CrmStore for UnavailableCrmStore {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn find_by_email(&self, _email: &str) -> BoxFuture<'_, StoreResult<Option<StoredContact>>> {
        self.fail()
    }

    fn create_contact(&self, _record: ContactRecord) -> BoxFuture<'_, StoreResult<StoredContact>> {
        self.fail()
    }

    fn update_notes(&self, _id: &str, _text: String) -> BoxFuture<'_, StoreResult<()>> {
        self.fail()
    }
}
