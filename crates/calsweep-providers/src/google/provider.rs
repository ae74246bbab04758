//! Google Calendar provider implementation.
//!
//! This module implements the [`CalendarProvider`] trait for Google Calendar.

use std::fmt;

use tokio::sync::RwLock as TokioRwLock;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult, Stage};
use crate::provider::{BoxFuture, CalendarProvider, FetchOptions, FetchResult, OnPage};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::tokens::TokenStorage;

const PROVIDER_NAME: &str = "google";

/// How credentials were obtained by [`GoogleProvider::authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Stored tokens were still valid.
    Cached,
    /// Stored tokens were expired and got refreshed.
    Refreshed,
    /// The interactive browser flow ran.
    Authorized,
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cached => "using stored credentials",
            Self::Refreshed => "refreshed stored credentials",
            Self::Authorized => "authorized in browser",
        };
        f.write_str(s)
    }
}

/// Google Calendar provider.
///
/// Owns the token file and an API client built from its access token.
pub struct GoogleProvider {
    config: GoogleConfig,
    token_storage: TokenStorage,
    oauth_client: OAuthClient,
    api_client: TokioRwLock<Option<GoogleCalendarClient>>,
}

impl GoogleProvider {
    /// Creates a new Google provider with the given configuration.
    ///
    /// Loads the token file if one exists but does not contact Google.
    /// Call [`GoogleProvider::authorize`] before listing.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::client_secrets)?;

        let token_storage = TokenStorage::new(&config.token_path);
        // An unreadable token file only means the user has to consent again
        if let Err(e) = token_storage.load() {
            warn!("ignoring token file {:?}: {}", config.token_path, e);
        }

        let oauth_client = OAuthClient::new(config.credentials.clone(), config.timeout)?
            .with_token_url(&config.token_url);

        Ok(Self {
            config,
            token_storage,
            oauth_client,
            api_client: TokioRwLock::new(None),
        })
    }

    /// Returns the provider configuration.
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Makes sure usable credentials exist, asking the user if needed.
    ///
    /// Valid stored tokens are reused and expired ones refreshed. The
    /// browser flow runs when neither works, when the stored grant lacks a
    /// configured scope, or when `force` is set. New tokens are written back
    /// to the token file.
    pub async fn authorize(&self, force: bool) -> ProviderResult<AuthOutcome> {
        if !force && !self.token_storage.needs_reauth(&self.config.scopes) {
            if self.token_storage.has_valid_tokens() {
                debug!("stored Google tokens are valid");
                self.install_client().await?;
                return Ok(AuthOutcome::Cached);
            }

            if self.token_storage.has_refresh_token() {
                match self.refresh().await {
                    Ok(()) => return Ok(AuthOutcome::Refreshed),
                    Err(e) => warn!("token refresh failed, re-authorizing: {}", e),
                }
            }
        }

        info!("starting Google authorization flow");
        let tokens = self
            .oauth_client
            .authorize(&self.config.scopes)
            .await
            .map_err(|e| e.at(Stage::SignIn))?;
        self.token_storage.set(tokens)?;
        self.install_client().await?;

        info!("authorization successful, tokens saved to {:?}", self.config.token_path);
        Ok(AuthOutcome::Authorized)
    }

    /// Ensures we have a valid API client, refreshing tokens if needed.
    async fn ensure_client(&self) -> ProviderResult<()> {
        if self.api_client.read().await.is_some() && self.token_storage.has_valid_tokens() {
            return Ok(());
        }

        if self.token_storage.get().is_none() {
            return Err(ProviderError::unauthenticated(
                "not authenticated - run 'calsweep auth'",
            )
            .at(Stage::SignIn));
        }

        if self.token_storage.has_valid_tokens() {
            self.install_client().await
        } else {
            self.refresh().await
        }
    }

    /// Redeems the stored refresh token and swaps in the new access token.
    async fn refresh(&self) -> ProviderResult<()> {
        let refresh_token = self
            .token_storage
            .get()
            .and_then(|t| t.refresh_token)
            .ok_or_else(|| {
                ProviderError::unauthenticated("no refresh token - re-authentication required")
                    .at(Stage::SignIn)
            })?;

        debug!("refreshing expired access token");
        let (access_token, expires_in) = self
            .oauth_client
            .refresh_token(&refresh_token)
            .await
            .map_err(|e| e.at(Stage::SignIn))?;

        self.token_storage
            .update_access_token(access_token, expires_in)?;
        self.install_client().await
    }

    /// Builds the API client from the stored access token.
    async fn install_client(&self) -> ProviderResult<()> {
        let tokens = self
            .token_storage
            .get()
            .ok_or_else(|| ProviderError::internal("no tokens to build a client from"))?;

        let mut client = self.api_client.write().await;
        match client.as_mut() {
            Some(c) => c.set_access_token(tokens.access_token),
            None => {
                *client = Some(
                    GoogleCalendarClient::new(tokens.access_token, self.config.timeout)?
                        .with_base_url(&self.config.api_base_url),
                );
            }
        }
        Ok(())
    }

    async fn fetch(
        &self,
        options: FetchOptions,
        on_page: OnPage<'_>,
    ) -> ProviderResult<FetchResult> {
        self.ensure_client().await?;

        let client = self.api_client.read().await;
        let client = client
            .as_ref()
            .ok_or_else(|| ProviderError::internal("API client not initialized"))?;

        info!(
            "listing events in {} from {} to {}",
            options.calendar_id,
            options.time_window.start_rfc3339(),
            options.time_window.end_rfc3339()
        );
        client
            .list_events(&options, on_page)
            .await
            .map_err(|e| e.at(Stage::Listing))
    }

    async fn delete(&self, calendar_id: &str, event_id: &str) -> ProviderResult<()> {
        self.ensure_client().await?;

        let client = self.api_client.read().await;
        let client = client
            .as_ref()
            .ok_or_else(|| ProviderError::internal("API client not initialized"))?;

        client
            .delete_event(calendar_id, event_id)
            .await
            .map_err(|e| e.at(Stage::Deleting))
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_events_with_progress<'a>(
        &'a self,
        options: FetchOptions,
        on_page: OnPage<'a>,
    ) -> BoxFuture<'a, ProviderResult<FetchResult>> {
        Box::pin(self.fetch(options, on_page))
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.delete(calendar_id, event_id))
    }

    fn is_authenticated(&self) -> bool {
        self.token_storage.has_valid_tokens() || self.token_storage.has_refresh_token()
    }
}
