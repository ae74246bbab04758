//! Errors raised while signing in to, listing from, or deleting on a calendar.
//!
//! Every error carries a [`ProviderErrorKind`] that the client branches on
//! (re-authorization hints, "already gone" deletes) and, once it has crossed
//! the provider boundary, the [`Stage`] of the sweep it interrupted.

use std::fmt;
use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// No usable grant: missing tokens, a rejected refresh, HTTP 401, or an
    /// aborted consent flow.
    Unauthenticated,
    /// HTTP 403. Usually a grant without the calendar scope or a read-only
    /// calendar.
    Forbidden,
    /// HTTP 429.
    RateLimited,
    /// HTTP 404 or 410. For a delete, the event is already gone.
    Gone,
    /// The request never produced an HTTP response.
    Transport,
    /// Any other non-success status.
    UnexpectedStatus,
    /// A response body that does not decode.
    Malformed,
    /// The OAuth client secrets file is missing or unusable.
    ClientSecrets,
    /// The token file cannot be read, written or removed.
    TokenFile,
    /// Local setup failed (HTTP client, loopback listener).
    Internal,
}

impl ProviderErrorKind {
    /// Stable snake_case name, used as a log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::Gone => "gone",
            Self::Transport => "transport",
            Self::UnexpectedStatus => "unexpected_status",
            Self::Malformed => "malformed",
            Self::ClientSecrets => "client_secrets",
            Self::TokenFile => "token_file",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of a sweep an error interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Loading, refreshing or obtaining OAuth tokens.
    SignIn,
    /// Paging through `events.list`.
    Listing,
    /// A single `events.delete`.
    Deleting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SignIn => "signing in",
            Self::Listing => "listing events",
            Self::Deleting => "deleting event",
        })
    }
}

#[derive(Debug, Error)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    stage: Option<Stage>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stage: None,
            source: None,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Forbidden, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn gone(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Gone, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn unexpected_status(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::UnexpectedStatus, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Malformed, message)
    }

    pub fn client_secrets(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::ClientSecrets, message)
    }

    pub fn token_file(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::TokenFile, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Internal, message)
    }

    /// Tags the error with the sweep stage it interrupted.
    pub fn at(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// True when signing in again (`calsweep auth --force`) is the fix.
    pub fn needs_reauth(&self) -> bool {
        self.kind == ProviderErrorKind::Unauthenticated
    }

    /// True when the target no longer exists.
    pub fn is_gone(&self) -> bool {
        self.kind == ProviderErrorKind::Gone
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(f, "{}: {}", stage, self.message),
            None => f.write_str(&self.message),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
