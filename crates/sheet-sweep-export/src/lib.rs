//! # sheet-sweep-export
//!
//! Writers for exported report ranges. CSV and XLSX are written locally from
//! the values read off the sheet; PDF has to be rendered by the spreadsheet
//! provider and is rejected here.

mod csv_writer;
mod error;
mod format;
mod options;
mod xlsx_writer;

pub use csv_writer::CsvWriter;
pub use error::{ExportError, ExportResult};
pub use format::ExportFormat;
pub use options::{CsvWriteOptions, LineTerminator};
pub use xlsx_writer::XlsxWriter;

use sheet_sweep_core::Grid;
use std::path::Path;

/// Write `grid` to `path` in a locally supported format
pub fn write_grid(format: ExportFormat, grid: &Grid, path: &Path) -> ExportResult<()> {
    match format {
        ExportFormat::Csv => CsvWriter::write_file(grid, path, &CsvWriteOptions::default()),
        ExportFormat::Xlsx => XlsxWriter::write_file(grid, path),
        ExportFormat::Pdf => Err(ExportError::Unsupported(format)),
    }
}
