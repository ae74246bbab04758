//! Configuration commands.
//!
//! `source` is the file the configuration was read from: the `--config`
//! path when given, the default location otherwise.

use std::io::Write;
use std::path::Path;

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration.
pub fn dump<W: Write + ?Sized>(
    config: &ClientConfig,
    source: &Path,
    out: &mut W,
) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Output(format!("failed to serialize config: {}", e)))?;
    let origin = if source.exists() { "" } else { ", not present" };
    writeln!(out, "# config.toml ({}{})", source.display(), origin)?;
    writeln!(out, "{}", toml_str)?;
    Ok(())
}

/// Check that the OAuth client file is present and well-formed.
pub fn validate(settings: &GoogleSettings) -> ClientResult<()> {
    let google = settings.to_provider_config()?;
    println!(
        "OAuth client {} loaded from {}.",
        google.credentials.client_id,
        settings.credentials_file.display()
    );
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path<W: Write + ?Sized>(source: &Path, out: &mut W) -> ClientResult<()> {
    writeln!(out, "config: {}", source.display())?;
    Ok(())
}
