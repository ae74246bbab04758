//! Client error types.

use std::fmt;

use calsweep_providers::ProviderError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Provider error (authentication, listing).
    Provider(ProviderError),
    /// IO error, including console reads and writes.
    Io(std::io::Error),
    /// Output could not be rendered.
    Output(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(err) => write!(f, "provider error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl ClientError {
    /// True when the stored Google grant is the problem.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::Provider(err) if err.needs_reauth())
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}
