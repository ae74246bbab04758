//! Google Calendar provider implementation.
//!
//! This module provides a [`GoogleProvider`] that lists and deletes events
//! through the Google Calendar API v3.
//!
//! # Authentication Flow
//!
//! 1. The user supplies an OAuth desktop client (`credentials.json`)
//! 2. Stored tokens in `token.json` are reused, or refreshed when expired
//! 3. Otherwise a loopback listener starts on a random localhost port and
//!    the browser opens Google's consent page with a PKCE challenge
//! 4. The redirect's authorization code is exchanged for tokens
//! 5. Tokens are written back to the token file
//!
//! # Example
//!
//! ```ignore
//! use calsweep_providers::google::{GoogleConfig, GoogleProvider, OAuthCredentials};
//!
//! let credentials = OAuthCredentials::from_file("credentials.json")?;
//! let provider = GoogleProvider::new(GoogleConfig::new(credentials))?;
//! provider.authorize(false).await?;
//!
//! let window = TimeWindow::for_year(2026).unwrap();
//! let events = provider.fetch_events(FetchOptions::new("primary", window)).await?;
//! ```

mod client;
mod config;
mod oauth;
mod provider;
mod tokens;

pub use client::GoogleCalendarClient;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, PkceFlow};
pub use provider::{AuthOutcome, GoogleProvider};
pub use tokens::{TokenInfo, TokenStorage};
