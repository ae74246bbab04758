//! OAuth token storage and management.
//!
//! Tokens are persisted in Google's "authorized user" JSON layout (`token`,
//! `refresh_token`, `token_uri`, `client_id`, `client_secret`, `scopes`,
//! `expiry`), so a token file written by other Google client libraries can be
//! picked up as-is.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Access tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// An authorized-user credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    #[serde(rename = "token")]
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Token endpoint the refresh token is redeemed at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,

    /// OAuth client the tokens were issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Secret of that OAuth client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// The OAuth scopes that were granted.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the access token expires.
    #[serde(default, rename = "expiry")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenInfo {
    /// Creates a new token info from OAuth response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            token_uri: None,
            client_id: None,
            client_secret: None,
            scopes,
            expires_at: expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }

    /// Records which client and endpoint these tokens belong to.
    pub fn with_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_uri: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self.token_uri = Some(token_uri.into());
        self
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= expires_at,
            // Tokens without an expiry are assumed valid
            None => false,
        }
    }

    /// Returns true if the token has the required scopes.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Updates the access token after a refresh.
    pub fn update_access_token(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs));
    }
}

/// Persisted token storage with file-based backend.
#[derive(Debug)]
pub struct TokenStorage {
    /// Path to the token file.
    path: PathBuf,

    /// In-memory copy of the current tokens.
    tokens: RwLock<Option<TokenInfo>>,
}

impl TokenStorage {
    /// Creates a new token storage at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: RwLock::new(None),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<TokenInfo>> {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<TokenInfo>> {
        self.tokens.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads tokens from disk into memory.
    ///
    /// Returns Ok(true) if tokens were loaded, Ok(false) if no token file exists.
    pub fn load(&self) -> ProviderResult<bool> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::token_file(format!("failed to read token file: {}", e))
        })?;

        let tokens: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::token_file(format!("failed to parse token file: {}", e))
        })?;

        info!("loaded tokens from {:?}", self.path);
        *self.write() = Some(tokens);
        Ok(true)
    }

    /// Saves the current tokens to disk.
    pub fn save(&self) -> ProviderResult<()> {
        let tokens = self.read();
        let tokens = tokens
            .as_ref()
            .ok_or_else(|| ProviderError::internal("no tokens to save"))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::token_file(format!("failed to create token directory: {}", e))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| ProviderError::internal(format!("failed to serialize tokens: {}", e)))?;

        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::token_file(format!("failed to write token file: {}", e))
        })?;

        // Restrict before the rename so the token is never world-readable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600));
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::token_file(format!("failed to rename token file: {}", e))
        })?;

        debug!("saved tokens to {:?}", self.path);
        Ok(())
    }

    /// Returns a clone of the current tokens, if any.
    pub fn get(&self) -> Option<TokenInfo> {
        self.read().clone()
    }

    /// Sets new tokens and saves them to disk.
    pub fn set(&self, tokens: TokenInfo) -> ProviderResult<()> {
        *self.write() = Some(tokens);
        self.save()
    }

    /// Updates the access token and saves to disk.
    pub fn update_access_token(
        &self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) -> ProviderResult<()> {
        {
            let mut tokens = self.write();
            let tokens = tokens
                .as_mut()
                .ok_or_else(|| ProviderError::internal("no tokens to update"))?;
            tokens.update_access_token(access_token, expires_in_secs);
        }
        self.save()
    }

    /// Clears the stored tokens (both in memory and on disk).
    pub fn clear(&self) -> ProviderResult<()> {
        *self.write() = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                ProviderError::token_file(format!("failed to remove token file: {}", e))
            })?;
            info!("cleared tokens from {:?}", self.path);
        }
        Ok(())
    }

    /// Returns the token storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if tokens are loaded and not expired.
    pub fn has_valid_tokens(&self) -> bool {
        self.read().as_ref().is_some_and(|t| !t.is_expired())
    }

    /// Returns true if tokens are loaded and have a refresh token.
    pub fn has_refresh_token(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|t| t.refresh_token.is_some())
    }

    /// Returns true if no tokens are stored or they lack a required scope.
    pub fn needs_reauth(&self, required_scopes: &[String]) -> bool {
        match self.read().as_ref() {
            None => true,
            Some(tokens) => !tokens.has_scopes(required_scopes),
        }
    }
}
