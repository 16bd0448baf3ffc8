//! XLSX writer

use std::path::Path;

use crate::error::{ExportError, ExportResult};
use rust_xlsxwriter::Workbook;
use sheet_sweep_core::Grid;

const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a grid to a single-sheet workbook. Blank cells are left empty.
    pub fn write_file<P: AsRef<Path>>(grid: &Grid, path: P) -> ExportResult<()> {
        let rows = grid.len();
        let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        if rows > MAX_ROWS || cols > MAX_COLS {
            return Err(ExportError::TooLarge { rows, cols });
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (row_idx, row) in grid.iter().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet.write_string(row_idx as u32, col_idx as u16, value)?;
            }
        }

        workbook.save(path.as_ref())?;
        Ok(())
    }
}
