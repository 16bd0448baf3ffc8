//! Provider configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default Sheets REST endpoint
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";
/// Default host serving `/spreadsheets/d/{id}/export`
pub const DEFAULT_EXPORT_BASE: &str = "https://docs.google.com";

/// Configuration for the Google Sheets provider.
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    /// Service account key file (JSON). Ignored when `access_token` is set.
    pub credentials_path: Option<PathBuf>,
    /// Pre-issued OAuth bearer token.
    pub access_token: Option<String>,
    /// Sheets REST endpoint. Default: [`DEFAULT_API_BASE`].
    pub api_base: String,
    /// Export endpoint host. Default: [`DEFAULT_EXPORT_BASE`].
    pub export_base: String,
    /// Pause after every cell write so dependent formulas start recalculating. Default: 2 seconds.
    pub settle_delay: Duration,
    /// Timeout for a single HTTP request. Default: 60 seconds.
    pub request_timeout: Duration,
}

impl Default for GoogleSheetsConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            export_base: DEFAULT_EXPORT_BASE.to_string(),
            settle_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(60),
        }
    }
}
