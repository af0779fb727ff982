use slotbook_core::{ContactRecord, StoredContact};
use tokio::sync::RwLock;

use super::{CrmStore, StoreError, StoreResult};
use crate::provider::BoxFuture;

/// Contacts held in memory.
#[derive(Debug, Default)]
pub struct MemoryCrmStore {
    contacts: RwLock<Vec<StoredContact>>,
}

impl MemoryCrmStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`, ids assigned in order.
    pub fn with_contacts(records: impl IntoIterator<Item = ContactRecord>) -> Self {
        let contacts = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| StoredContact {
                id: format!("c-{}", i + 1),
                record,
            })
            .collect();
        Self {
            contacts: RwLock::new(contacts),
        }
    }

    /// Returns a snapshot of every contact.
    pub async fn contacts(&self) -> Vec<StoredContact> {
        self.contacts.read().await.clone()
    }
}

impl CrmStore for MemoryCrmStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn find_by_email(&self, email: &str) -> BoxFuture<'_, StoreResult<Option<StoredContact>>> {
        let email = email.to_string();
        Box::pin(async move {
            Ok(self
                .contacts
                .read()
                .await
                .iter()
                .find(|c| c.record.email == email)
                .cloned())
        })
    }

    fn create_contact(&self, record: ContactRecord) -> BoxFuture<'_, StoreResult<StoredContact>> {
        Box::pin(async move {
            let mut contacts = self.contacts.write().await;
            if contacts.iter().any(|c| c.record.email == record.email) {
                return Err(StoreError::DuplicateEmail(record.email));
            }
            let stored = StoredContact {
                id: format!("c-{}", contacts.len() + 1),
                record,
            };
            contacts.push(stored.clone());
            Ok(stored)
        })
    }

    fn update_notes(&self, id: &str, text: String) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut contacts = self.contacts.write().await;
            let contact = contacts
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(StoreError::NotFound(id))?;
            contact.record.notes_text = text;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(email: &str) -> ContactRecord {
        ContactRecord {
            email: email.into(),
            display_name: "A".into(),
            notes_text: "N1".into(),
            first_meeting_date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_find_update() {
        let store = MemoryCrmStore::new();
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());

        let created = store.create_contact(record("a@x.com")).await.unwrap();
        assert_eq!(created.id, "c-1");

        store.update_notes(&created.id, "N1\n\n---\nN2".into()).await.unwrap();
        let found = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.record.notes_text, "N1\n\n---\nN2");
    }

    #[tokio::test]
    async fn email_is_unique() {
        let store = MemoryCrmStore::with_contacts([record("a@x.com")]);
        let err = store.create_contact(record("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(e) if e == "a@x.com"));
        assert_eq!(store.contacts().await.len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_id() {
        let store = MemoryCrmStore::new();
        let err = store.update_notes("c-9", "x".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "c-9"));
    }
}
