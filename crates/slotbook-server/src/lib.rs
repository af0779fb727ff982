//! Services: availability queries, booking orchestration, CRM sync.
//!
//! This crate wires the pure rules of `slotbook-core` to the collaborators
//! of `slotbook-providers`:
//! - [`AvailabilityEngine`] answers "which slots are free on this day"
//! - [`BookingOrchestrator`] writes the calendar event, then hands the
//!   contact to a detached CRM sync task
//! - [`ContactUpsert`] reconciles one contact in the CRM store
//! - [`RequestHandler`] maps protocol requests onto the services
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use slotbook_protocol::Request;
//! use slotbook_providers::{MemoryCalendar, MemoryCrmStore};
//! use slotbook_server::{RequestHandler, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handler = RequestHandler::new(
//!         ServiceConfig::default(),
//!         Arc::new(MemoryCalendar::new()),
//!         Arc::new(MemoryCrmStore::new()),
//!     );
//!     let response = handler
//!         .handle(&Request::availability("2030-03-11", "Asia/Tokyo"))
//!         .await;
//!     println!("{response:?}");
//! }
//! ```

mod availability;
mod booking;
mod config;
mod contact;
mod crm_sync;
mod error;
mod handler;

pub use availability::{AvailabilityEngine, AvailabilityReport, SlotVerdict};
pub use booking::{BookingOrchestrator, BookingReceipt, PhaseTrace};
pub use config::{ServiceConfig, WindowAnchor};
pub use contact::{ContactUpsert, CrmOutcome};
pub use crm_sync::{CrmSyncHandle, CrmSyncJob, spawn_crm_sync};
pub use error::{CrmSyncError, ServiceError, ServiceResult};
pub use handler::RequestHandler;
