//! calsweep CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calsweep_client::cli::{Cli, Command, ConfigAction};
use calsweep_client::commands;
use calsweep_client::config::ClientConfig;
use calsweep_client::error::{ClientError, ClientResult};
use calsweep_core::{TracingConfig, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.needs_reauth() {
                eprintln!("hint: run `calsweep auth --force` to sign in again");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path).map_err(ClientError::Config)?,
        None => ClientConfig::load().map_err(ClientError::Config)?,
    };
    config.debug |= cli.debug;
    config.google = config
        .google
        .with_overrides(cli.credentials_file, cli.token_file);

    let tracing = if config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match cli.command {
        None | Some(Command::Sweep) => commands::sweep::run(&config.google).await,
        Some(Command::Groups { json }) => commands::groups::run(&config.google, json).await,
        Some(Command::Auth { force, logout }) => {
            commands::auth::run(&config.google, force, logout).await
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => {
                commands::config::dump(&config, &config_path, &mut std::io::stdout())
            }
            ConfigAction::Validate => commands::config::validate(&config.google),
            ConfigAction::Path => commands::config::path(&config_path, &mut std::io::stdout()),
        },
    }
}
