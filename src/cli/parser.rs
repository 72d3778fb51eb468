//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Live table notification feed
#[derive(Parser, Debug)]
#[command(name = "tablefeed")]
#[command(about = "Live table notification feed for venue staff")]
#[command(long_about = "
tablefeed follows a venue's live notification stream, keeps the most recent
notifications grouped by table, and rings a sound for every new one once
sound has been enabled.

EXAMPLES:
    # Watch the configured feed
    tablefeed

    # Watch a specific endpoint, only table 12, with sound enabled up front
    tablefeed watch --url http://10.0.0.5:4000/notifications --table 12 --sound

    # Replay a recorded session and print the grouped view
    tablefeed replay session.ndjson --text water

    # Validate configuration
    tablefeed --env production check
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute; `watch` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Loads this single TOML file instead of the layered configuration
    /// directory. Environment variable overrides still apply.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` is layered over `default.toml`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Follow the live feed (default)
    ///
    /// Renders the grouped view on every change and reads commands from
    /// stdin: `table <n>`, `text <s>`, `clear`, `sound`, `help`, `quit`.
    ///
    /// Examples:
    ///   tablefeed watch
    ///   tablefeed watch --table 5 --sound
    Watch {
        /// Feed endpoint, overrides `stream.url`
        #[arg(long, value_name = "URL", value_parser = super::validation::validate_stream_url)]
        url: Option<String>,

        /// Only show this table
        #[arg(short, long, value_name = "TABLE")]
        table: Option<String>,

        /// Only show messages containing this text (case-insensitive)
        #[arg(long, value_name = "TEXT")]
        text: Option<String>,

        /// Enable notification sound immediately
        #[arg(short, long)]
        sound: bool,
    },

    /// Feed a recorded NDJSON session through the feed and print the result
    ///
    /// Examples:
    ///   tablefeed replay session.ndjson
    ///   cat session.ndjson | tablefeed replay - --json
    Replay {
        /// Recording to read, `-` for stdin
        #[arg(value_name = "FILE", value_parser = super::validation::validate_replay_source)]
        source: String,

        /// Only show this table
        #[arg(short, long, value_name = "TABLE")]
        table: Option<String>,

        /// Only show messages containing this text (case-insensitive)
        #[arg(long, value_name = "TEXT")]
        text: Option<String>,

        /// Print the grouped view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and print the effective settings
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl Cli {
    /// The subcommand to run, with `watch` standing in for none.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Watch {
            url: None,
            table: None,
            text: None,
            sound: false,
        })
    }
}
