//! Google Calendar provider.
//!
//! Availability comes from `freeBusy.query`; bookings go through
//! `events.insert` with `sendUpdates=all` so every attendee receives an
//! invitation. When a conference is requested, the booking's idempotency key
//! becomes the Meet `createRequest.requestId`, which Google uses to avoid
//! creating a second conference for a retried insert.
//!
//! # Example
//!
//! ```ignore
//! use slotbook_providers::google::{GoogleConfig, GoogleProvider};
//!
//! let provider = GoogleProvider::new(GoogleConfig::new(access_token))?;
//! let busy = provider.query_free_busy("primary", window).await?;
//! ```

mod client;
mod config;
mod provider;

pub use client::GoogleCalendarClient;
pub use config::{DEFAULT_API_BASE, GoogleConfig};
pub use provider::GoogleProvider;
