//! Google Calendar provider configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client credentials for Google API access.
///
/// Google requires a registered application; the client ID and secret come
/// from the Cloud Console's "OAuth client ID (Desktop app)" download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
}

/// Structure of Google's OAuth client secrets JSON file.
///
/// Supports the Cloud Console format with an `installed` or `web` section,
/// and a flat format with `client_id`/`client_secret` at the root.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads OAuth credentials from a client secrets JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::client_secrets(format!(
                "failed to read client secrets file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    /// Parses OAuth credentials from a client secrets JSON string.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::client_secrets(format!("failed to parse client secrets JSON: {}", e))
        })?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(ProviderError::client_secrets(
            "client secrets file must contain an 'installed'/'web' section or 'client_id'/'client_secret' at root level",
        ))
    }

    /// Validates that the credentials appear to be correctly formatted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the Google Calendar provider.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth credentials for API access.
    pub credentials: OAuthCredentials,

    /// Path of the authorized-user token file.
    ///
    /// Defaults to `token.json` in the working directory.
    pub token_path: PathBuf,

    /// Request timeout.
    pub timeout: Duration,

    /// OAuth scopes to request.
    ///
    /// Defaults to full calendar access, which deletion needs.
    pub scopes: Vec<String>,

    /// Base URL of the Calendar API.
    pub api_base_url: String,

    /// OAuth token endpoint.
    pub token_url: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// OAuth scope granting read/write calendar access.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar";

    /// Default token file name.
    pub const DEFAULT_TOKEN_FILE: &'static str = "token.json";

    /// Base URL for Google Calendar API v3.
    pub const CALENDAR_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Google's OAuth token endpoint.
    pub const GOOGLE_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Creates a new Google configuration with the given credentials.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            token_path: PathBuf::from(Self::DEFAULT_TOKEN_FILE),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            api_base_url: Self::CALENDAR_API_BASE.to_string(),
            token_url: Self::GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Sets the token storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        Ok(())
    }
}
