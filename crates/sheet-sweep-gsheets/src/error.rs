//! Error types for the Google Sheets provider.

use sheet_sweep::SweepError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid spreadsheet URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether the API rejected a range for lying past the sheet's grid
    pub fn is_grid_limit(&self) -> bool {
        match self {
            ApiError::Http { status: 400, body } => {
                let body = body.to_ascii_lowercase();
                body.contains("exceeds grid limits") || body.contains("out of bounds")
            }
            _ => false,
        }
    }

    /// Convert into the engine's error, using `fallback` for failures that
    /// belong to the calling operation (read, write or export).
    pub fn into_sweep(self, fallback: fn(String) -> SweepError) -> SweepError {
        if self.is_grid_limit() {
            return SweepError::OutOfBounds(self.to_string());
        }
        match self {
            ApiError::Auth(_) | ApiError::InvalidUrl(_) => SweepError::Connection(self.to_string()),
            ApiError::Http { status: 401 | 403, .. } => SweepError::Connection(self.to_string()),
            ApiError::Http { status: 404, .. } => SweepError::NotFound(self.to_string()),
            ApiError::Io(e) => SweepError::Io(e),
            other => fallback(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
