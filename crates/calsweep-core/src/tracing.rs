//! Tracing setup for calsweep
//!
//! Log output goes to stderr so it never interleaves with the review prompts
//! on stdout. `RUST_LOG` overrides the level picked by the config.
//!
//! # Usage
//!
//! ```ignore
//! use calsweep_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for calsweep's own crates when RUST_LOG is not set
    pub default_level: Level,
    /// Whether to include file/line information in logs
    pub include_location: bool,
    /// Whether to include target (module path) in logs
    pub include_target: bool,
    /// Whether to include timestamps
    pub include_timestamp: bool,
}

impl Default for TracingConfig {
    /// Warnings only: failed deletes and ignored token files.
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            include_location: false,
            include_target: false,
            include_timestamp: false,
        }
    }
}

impl TracingConfig {
    /// Config for `--debug`: every page, decision and request, with where it
    /// came from.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            include_target: true,
            include_timestamp: true,
        }
    }

    /// Matches `calsweep_core`, `calsweep_providers` and `calsweep_client`
    /// by prefix.
    fn default_directive(&self) -> String {
        format!("calsweep={}", self.default_level)
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target);

    let layer = if config.include_timestamp {
        layer.boxed()
    } else {
        layer.without_time().boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(config.env_filter())
        .with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
