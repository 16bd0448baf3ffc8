//! Export error types

use thiserror::Error;

use crate::format::ExportFormat;

/// Result type for export operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while writing an exported range
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XLSX library error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Grid does not fit in a worksheet
    #[error("Grid too large for XLSX: {rows} rows x {cols} columns")]
    TooLarge { rows: usize, cols: usize },

    /// The format has to be rendered by the spreadsheet provider
    #[error("{0} export cannot be written locally")]
    Unsupported(ExportFormat),
}
