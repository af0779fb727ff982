//! CRM contact reconciliation.

use std::sync::Arc;

use chrono::NaiveDate;
use slotbook_core::{ContactRecord, NotesTruncation, merge_notes, note_block, truncate_notes};
use slotbook_providers::CrmStore;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::CrmSyncError;

/// What a reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmOutcome {
    /// A new contact was created.
    Created {
        /// Store id of the new contact.
        id: String,
    },
    /// Notes were appended to an existing contact.
    Updated {
        /// Store id of the existing contact.
        id: String,
    },
}

/// Find-by-email, then merge notes or create.
#[derive(Clone)]
pub struct ContactUpsert {
    store: Arc<dyn CrmStore>,
    notes_limit: usize,
    truncation: NotesTruncation,
}

impl ContactUpsert {
    /// Creates an upsert over `store`.
    pub fn new(store: Arc<dyn CrmStore>, notes_limit: usize, truncation: NotesTruncation) -> Self {
        Self {
            store,
            notes_limit,
            truncation,
        }
    }

    /// Creates an upsert using the notes settings of `config`.
    pub fn from_config(store: Arc<dyn CrmStore>, config: &ServiceConfig) -> Self {
        Self::new(store, config.notes_limit, config.notes_truncation)
    }

    /// Returns the store name.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Reconciles one booking into the CRM.
    ///
    /// The trimmed email is the key and is matched exactly. Repeated calls
    /// append repeated note blocks.
    pub async fn reconcile(
        &self,
        email: &str,
        name: &str,
        meeting_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<CrmOutcome, CrmSyncError> {
        let email = email.trim().to_string();
        let block = note_block(meeting_date, notes);

        let existing = self
            .store
            .find_by_email(&email)
            .await
            .map_err(CrmSyncError::Lookup)?;

        match existing {
            Some(contact) => {
                let merged = merge_notes(
                    &contact.record.notes_text,
                    &block,
                    self.notes_limit,
                    self.truncation,
                );
                debug!(
                    contact_id = %contact.id,
                    notes_len = merged.chars().count(),
                    "Appending meeting notes"
                );
                self.store
                    .update_notes(&contact.id, merged)
                    .await
                    .map_err(CrmSyncError::Update)?;
                Ok(CrmOutcome::Updated { id: contact.id })
            }
            None => {
                let record = ContactRecord {
                    email,
                    display_name: name.trim().to_string(),
                    notes_text: truncate_notes(&block, self.notes_limit, self.truncation),
                    first_meeting_date: meeting_date,
                };
                let stored = self
                    .store
                    .create_contact(record)
                    .await
                    .map_err(CrmSyncError::Create)?;
                debug!(contact_id = %stored.id, "Created contact");
                Ok(CrmOutcome::Created { id: stored.id })
            }
        }
    }
}
