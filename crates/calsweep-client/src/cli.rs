//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calsweep - bulk-delete look-alike Google Calendar events, one title group at a time
#[derive(Debug, Parser)]
#[command(name = "calsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// OAuth client secrets file from the Google Cloud Console
    #[arg(long, env = "CALSWEEP_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Token file to read and write
    #[arg(long, env = "CALSWEEP_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Review and delete event groups (the default)
    Sweep,

    /// Show how events group, without deleting anything
    Groups {
        /// Print the grouping as JSON
        #[arg(long)]
        json: bool,
    },

    /// Authorize access to Google Calendar
    Auth {
        /// Run the browser flow even if stored tokens still work
        #[arg(long, short, conflicts_with = "logout")]
        force: bool,

        /// Remove the stored token file
        #[arg(long)]
        logout: bool,
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
