//! CLI: configuration, availability and booking commands
//!
//! This crate provides the `slotbook` command-line interface. Commands run
//! the booking services in-process against the configured calendar and
//! contact store.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;
pub mod service;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
