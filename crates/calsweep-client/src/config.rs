//! Client configuration.
//!
//! Settings live in an optional `config.toml` at
//! `~/.config/calsweep/config.toml` by default. Only file locations and the
//! request timeout are configurable; the swept calendar and year are fixed
//! by [`SweepTarget`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use calsweep_core::TimeWindow;
use calsweep_providers::FetchOptions;
use calsweep_providers::google::{GoogleConfig, OAuthCredentials};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the calsweep client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Google Calendar settings.
    pub google: GoogleSettings,
}

impl ClientConfig {
    /// Loads configuration from the default path, if it exists.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calsweep")
    }
}

/// Google Calendar provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client secrets file downloaded from the Cloud Console.
    pub credentials_file: PathBuf,

    /// Authorized-user token file, read and rewritten on each run.
    pub token_file: PathBuf,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from(GoogleConfig::DEFAULT_TOKEN_FILE),
            timeout_secs: GoogleConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GoogleSettings {
    /// Applies command-line overrides.
    pub fn with_overrides(
        mut self,
        credentials_file: Option<PathBuf>,
        token_file: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = credentials_file {
            self.credentials_file = path;
        }
        if let Some(path) = token_file {
            self.token_file = path;
        }
        self
    }

    /// Reads the client secrets file and builds the provider configuration.
    pub fn to_provider_config(&self) -> ClientResult<GoogleConfig> {
        if !self.credentials_file.exists() {
            return Err(ClientError::Config(format!(
                "OAuth client file {} not found. Download an OAuth client ID \
                 (Desktop app) from the Google Cloud Console and save it there, \
                 or pass --credentials-file <path>",
                self.credentials_file.display()
            )));
        }

        let credentials = OAuthCredentials::from_file(&self.credentials_file)?;
        credentials.validate().map_err(|e| {
            ClientError::Config(format!(
                "invalid OAuth client in {}: {}",
                self.credentials_file.display(),
                e
            ))
        })?;

        Ok(GoogleConfig::new(credentials)
            .with_token_path(&self.token_file)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

/// The fixed calendar and year a sweep covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepTarget {
    /// Calendar to sweep.
    pub calendar_id: String,
    /// Calendar year whose events are listed.
    pub year: i32,
}

impl SweepTarget {
    /// The user's primary calendar.
    pub const CALENDAR_ID: &'static str = "primary";

    /// The swept year.
    pub const YEAR: i32 = 2026;

    /// Largest page the Calendar API hands out.
    pub const PAGE_SIZE: usize = 2500;

    /// Returns the listing window, January 1st to January 1st in UTC.
    pub fn window(&self) -> ClientResult<TimeWindow> {
        TimeWindow::for_year(self.year)
            .ok_or_else(|| ClientError::Config(format!("year {} is out of range", self.year)))
    }

    /// Builds listing options: expanded recurring instances, ordered by start.
    pub fn fetch_options(&self) -> ClientResult<FetchOptions> {
        Ok(FetchOptions::new(&self.calendar_id, self.window()?).with_page_size(Self::PAGE_SIZE))
    }
}

impl Default for SweepTarget {
    fn default() -> Self {
        Self {
            calendar_id: Self::CALENDAR_ID.to_string(),
            year: Self::YEAR,
        }
    }
}
