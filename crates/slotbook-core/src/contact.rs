//! CRM contact records and note merging.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Text placed between accumulated note blocks.
pub const NOTE_SEPARATOR: &str = "\n\n---\n";

/// Default length limit (in characters) of the CRM notes field.
pub const DEFAULT_NOTES_LIMIT: usize = 5000;

/// A contact as stored in the CRM. `email` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    /// Unique key.
    pub email: String,
    /// Name given at first booking.
    pub display_name: String,
    /// Accumulated note blocks.
    pub notes_text: String,
    /// Date of the first booked meeting.
    pub first_meeting_date: NaiveDate,
}

/// A contact together with the store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContact {
    /// Store identifier, used for updates.
    pub id: String,
    /// The record.
    pub record: ContactRecord,
}

/// Which end of the accumulated notes survives when the field limit is hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotesTruncation {
    /// Drop the oldest text; the latest note is always kept.
    #[default]
    KeepNewest,
    /// Drop the newest text once the field is full.
    KeepOldest,
}

/// Formats the note block appended for one meeting.
pub fn note_block(meeting_date: NaiveDate, notes: Option<&str>) -> String {
    let heading = format!("Meeting on {}", meeting_date.format("%Y-%m-%d"));
    match notes.map(str::trim).filter(|n| !n.is_empty()) {
        Some(notes) => format!("{heading}\n{notes}"),
        None => heading,
    }
}

/// Appends `block` to `existing` and bounds the result to `limit` characters.
pub fn merge_notes(existing: &str, block: &str, limit: usize, policy: NotesTruncation) -> String {
    let combined = if existing.trim().is_empty() {
        block.to_string()
    } else {
        format!("{existing}{NOTE_SEPARATOR}{block}")
    };
    truncate_notes(&combined, limit, policy)
}

/// Truncates on character boundaries according to `policy`.
pub fn truncate_notes(text: &str, limit: usize, policy: NotesTruncation) -> String {
    let len = text.chars().count();
    if len <= limit {
        return text.to_string();
    }
    match policy {
        NotesTruncation::KeepOldest => text.chars().take(limit).collect(),
        NotesTruncation::KeepNewest => text.chars().skip(len - limit).collect(),
    }
}
