//! Error types for the Brute Guard service.

use thiserror::Error;

/// Main error type for Brute Guard operations.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Configuration-related errors, raised at construction time
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed caller input (CIDR, login, password)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The allow/deny list store failed
    #[error("List store error: {0}")]
    ListStore(String),

    /// The attempt counter backend failed
    #[error("Limiter error: {0}")]
    Limiter(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<::config::ConfigError> for GuardError {
    fn from(err: ::config::ConfigError) -> Self {
        GuardError::Config(err.to_string())
    }
}

/// Result type alias for Brute Guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
