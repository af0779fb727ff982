//! slotbook CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use slotbook_client::cli::{Cli, Command, ConfigAction};
use slotbook_client::commands;
use slotbook_client::config::ClientConfig;
use slotbook_client::error::{ClientError, ClientResult};
use slotbook_client::service::build_handler;
use slotbook_core::{TracingConfig, TracingOutputFormat, init_tracing};
use slotbook_protocol::BookingPayload;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
            .with_level(Level::WARN)
            .with_format(TracingOutputFormat::Compact)
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };
    let grace = config.booking.crm_grace();

    match cli.command {
        Command::Availability { date, timezone } => {
            let handler = build_handler(&config)?;
            commands::availability::run(&handler, &date, &timezone, cli.json).await
        }
        Command::Book {
            name,
            email,
            start,
            end,
            timezone,
            notes,
            guests,
        } => {
            let handler = build_handler(&config)?;
            let mut payload = BookingPayload::new(name, email, start, end, timezone);
            payload.notes = notes;
            payload.guests = guests;
            commands::book::run(&handler, payload, grace, cli.json).await
        }
        Command::Request { input } => {
            let handler = build_handler(&config)?;
            commands::request::run(&handler, &input, grace).await
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        },
    }
}
