//! Contacts persisted as a JSON document on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slotbook_core::{ContactRecord, StoredContact};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{CrmStore, StoreError, StoreResult};
use crate::provider::BoxFuture;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    contacts: Vec<StoredContact>,
}

/// A contact store backed by a single JSON file.
///
/// Every operation reads the file, and writes go through a temp file and a
/// rename, so a crash never leaves a half-written document. A missing file
/// is an empty store. File I/O runs on the blocking pool.
#[derive(Debug)]
pub struct JsonFileCrmStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl JsonFileCrmStore {
    /// Creates a store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document, applies `op` and, if `op` reports a change,
    /// writes it back. Runs under the store lock on the blocking pool.
    async fn transact<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Document) -> StoreResult<(T, bool)> + Send + 'static,
    {
        let _guard = self.guard.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut document = load(&path)?;
            let (value, changed) = op(&mut document)?;
            if changed {
                save(&path, &document)?;
            }
            Ok(value)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("contact file task failed: {}", e)))?
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn load(path: &Path) -> StoreResult<Document> {
    if !path.exists() {
        return Ok(Document::default());
    }
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    if content.trim().is_empty() {
        return Ok(Document::default());
    }
    Ok(serde_json::from_str(&content)?)
}

fn save(path: &Path, document: &Document) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(document)?;
    fs::write(&temp_path, content).map_err(|e| io_error(path, e))?;
    fs::rename(&temp_path, path).map_err(|e| io_error(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            warn!(path = %path.display(), error = %e, "Failed to restrict contact file permissions");
        }
    }

    debug!(path = %path.display(), contacts = document.contacts.len(), "saved contacts");
    Ok(())
}

impl CrmStore for JsonFileCrmStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn find_by_email(&self, email: &str) -> BoxFuture<'_, StoreResult<Option<StoredContact>>> {
        let email = email.to_string();
        Box::pin(self.transact(move |document| {
            let found = document
                .contacts
                .iter()
                .find(|c| c.record.email == email)
                .cloned();
            Ok((found, false))
        }))
    }

    fn create_contact(&self, record: ContactRecord) -> BoxFuture<'_, StoreResult<StoredContact>> {
        Box::pin(self.transact(move |document| {
            if document.contacts.iter().any(|c| c.record.email == record.email) {
                return Err(StoreError::DuplicateEmail(record.email));
            }
            document.next_id += 1;
            let stored = StoredContact {
                id: format!("c-{}", document.next_id),
                record,
            };
            document.contacts.push(stored.clone());
            Ok((stored, true))
        }))
    }

    fn update_notes(&self, id: &str, text: String) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.to_string();
        Box::pin(self.transact(move |document| {
            let contact = document
                .contacts
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(StoreError::NotFound(id))?;
            contact.record.notes_text = text;
            Ok(((), true))
        }))
    }
}
