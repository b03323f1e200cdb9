//! Error types for weekcal.

use thiserror::Error;

/// Errors that can occur in weekcal operations.
#[derive(Error, Debug)]
pub enum WeekcalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Unexpected remote response: {0}")]
    RemoteProtocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl WeekcalError {
    /// Whether this error means the remote store could not be reached or
    /// refused the request, as opposed to bad input.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            WeekcalError::RemoteUnavailable(_) | WeekcalError::RemoteProtocol(_)
        )
    }
}

impl From<reqwest::Error> for WeekcalError {
    fn from(err: reqwest::Error) -> Self {
        WeekcalError::RemoteUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for WeekcalError {
    fn from(err: serde_json::Error) -> Self {
        WeekcalError::Serialization(err.to_string())
    }
}

/// Result type alias for weekcal operations.
pub type WeekcalResult<T> = Result<T, WeekcalError>;
