//! External collaborators of the booking core.
//!
//! - [`CalendarProvider`] - the owner's calendar: free/busy reads and event writes
//! - [`CrmStore`] - the contact store bookings are mirrored into
//! - [`ProviderError`] / [`StoreError`] - their failure types
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   ┌──────────────────┐
//! │ Google Calendar │   │  MemoryCalendar  │
//! └────────┬────────┘   └────────┬─────────┘
//!          └──── CalendarProvider ┘
//!
//! ┌─────────────────┐   ┌──────────────────┐
//! │ JsonFileCrmStore│   │  MemoryCrmStore  │
//! └────────┬────────┘   └────────┬─────────┘
//!          └────── CrmStore ─────┘
//! ```

pub mod crm;
pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod memory;
pub mod provider;

// Re-export main types at crate root
pub use crm::{CrmStore, JsonFileCrmStore, MemoryCrmStore, StoreError, StoreResult, UnavailableCrmStore};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use memory::{MemoryCalendar, StoredEvent};
pub use provider::{BoxFuture, CalendarProvider, CreatedEvent, ErrorProvider, NewEvent};
