//! CLI, configuration, and the interactive review loop.
//!
//! This crate provides the `calsweep` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompt;
pub mod review;

#[cfg(test)]
mod test_support;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
