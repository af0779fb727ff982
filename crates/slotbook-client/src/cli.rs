//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// slotbook - Find a free slot and book it
#[derive(Debug, Parser)]
#[command(name = "slotbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "SLOTBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Print responses as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the slots of one day
    Availability {
        /// Date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Your IANA timezone (unknown values fall back to UTC)
        #[arg(long = "tz", default_value = "UTC")]
        timezone: String,
    },

    /// Book a slot
    Book {
        /// Your name
        #[arg(long)]
        name: String,

        /// Your email
        #[arg(long)]
        email: String,

        /// Start, RFC 3339 or local YYYY-MM-DDTHH:MM in --tz
        #[arg(long)]
        start: String,

        /// End, same format as --start
        #[arg(long)]
        end: String,

        /// Timezone local times are read in
        #[arg(long = "tz", default_value = "UTC")]
        timezone: String,

        /// Notes for the meeting
        #[arg(long)]
        notes: Option<String>,

        /// Guest email (can be repeated)
        #[arg(long = "guest", action = clap::ArgAction::Append)]
        guests: Vec<String>,
    },

    /// Handle a JSON request read from a file, or stdin with "-"
    Request {
        /// Request file
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_book() {
        let cli = Cli::try_parse_from([
            "slotbook",
            "book",
            "--name",
            "Ada",
            "--email",
            "ada@example.com",
            "--start",
            "2024-03-12T10:00",
            "--end",
            "2024-03-12T10:30",
            "--tz",
            "Asia/Tokyo",
            "--guest",
            "a@x.com",
            "--guest",
            "b@x.com",
        ])
        .unwrap();
        match cli.command {
            Command::Book {
                timezone, guests, ..
            } => {
                assert_eq!(timezone, "Asia/Tokyo");
                assert_eq!(guests, ["a@x.com", "b@x.com"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn availability_defaults_to_utc() {
        let cli =
            Cli::try_parse_from(["slotbook", "--json", "availability", "--date", "2024-03-12"])
                .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Availability { ref timezone, .. } if timezone == "UTC"
        ));
    }

    #[test]
    fn request_reads_stdin_by_default() {
        let cli = Cli::try_parse_from(["slotbook", "request"]).unwrap();
        assert!(matches!(cli.command, Command::Request { ref input } if input.as_os_str() == "-"));
    }
}
