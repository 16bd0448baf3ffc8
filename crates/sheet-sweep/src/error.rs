//! Error types for the sweep engine and spreadsheet providers.

use crate::batch::RunSummary;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Range exceeds grid limits: {0}")]
    OutOfBounds(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] sheet_sweep_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Critical error: {0}")]
    Critical(String),

    /// A run stopped by a fatal error, with the results gathered before it
    #[error("Run aborted: {source}")]
    Aborted {
        summary: Box<RunSummary>,
        source: Box<SweepError>,
    },
}

impl SweepError {
    /// Errors that stop a whole run rather than a single value.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SweepError::Connection(_)
                | SweepError::Critical(_)
                | SweepError::InvalidInput(_)
                | SweepError::Aborted { .. }
        )
    }

    /// Results of the values processed before a run was aborted
    pub fn partial_summary(&self) -> Option<&RunSummary> {
        match self {
            SweepError::Aborted { summary, .. } => Some(summary.as_ref()),
            _ => None,
        }
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, SweepError::OutOfBounds(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SweepError::NotFound(_))
    }

    /// Message suitable for a per-value failure report, without the variant prefix.
    pub fn reason(&self) -> String {
        match self {
            SweepError::Connection(msg)
            | SweepError::NotFound(msg)
            | SweepError::OutOfBounds(msg)
            | SweepError::Read(msg)
            | SweepError::Write(msg)
            | SweepError::Export(msg)
            | SweepError::Critical(msg) => msg.clone(),
            SweepError::InvalidInput(e) => e.to_string(),
            SweepError::Io(e) => e.to_string(),
            SweepError::Aborted { source, .. } => source.reason(),
        }
    }
}

impl From<sheet_sweep_export::ExportError> for SweepError {
    fn from(e: sheet_sweep_export::ExportError) -> Self {
        SweepError::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
