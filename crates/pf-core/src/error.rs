//! Error types for PromptForge

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the PromptForge system
///
/// Only [`Error::Validation`] is ever surfaced by the engine to its callers.
/// Everything a collaborator raises is recovered locally.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Generation service error: {0}")]
    Service(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Response withheld by safety filter: {0}")]
    SafetyBlocked(String),

    #[error("Unexpected response format: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// True for the one error kind that is allowed to fail a request end to end
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
