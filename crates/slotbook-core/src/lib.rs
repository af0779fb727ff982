//! Core types: zones, slots, availability verdicts, bookings, contacts

pub mod availability;
pub mod booking;
pub mod contact;
pub mod slot;
pub mod time;
pub mod tracing;
pub mod zone;

pub use availability::{classify, conflicts, is_available, relevant_busy, BusyInterval, SlotStatus};
pub use booking::{is_valid_email, parse_booking_time, BookingPhase, BookingRequest, ValidationError};
pub use contact::{
    merge_notes, note_block, truncate_notes, ContactRecord, NotesTruncation, StoredContact,
    DEFAULT_NOTES_LIMIT, NOTE_SEPARATOR,
};
pub use slot::{Slot, SlotWindow};
pub use time::TimeWindow;
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
pub use zone::{from_wall_clock, parse_zone, to_zone, validate, ValidatedZone, ZoneError};
