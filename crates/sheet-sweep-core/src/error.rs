//! Error types for sheet-sweep-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheet-sweep-core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid range reference format
    #[error("Invalid range reference: {0}")]
    InvalidRange(String),

    /// Value outside the accepted domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new "invalid input" error with a message
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }
}
