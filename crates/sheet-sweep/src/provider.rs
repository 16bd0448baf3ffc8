//! The spreadsheet provider seam
//!
//! Everything the engine needs from a live spreadsheet goes through
//! [`SpreadsheetProvider`]. The Google Sheets client implements it over HTTP;
//! [`MemoryWorkbook`](crate::memory::MemoryWorkbook) implements it in memory
//! for tests and dry runs.

use crate::error::{Result, SweepError};
use sheet_sweep_core::{CellAddress, Grid, RangeBound, RangeReference};
use sheet_sweep_export::ExportFormat;
use std::path::{Path, PathBuf};

/// A worksheet (tab) inside the open spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    /// Tab title
    pub title: String,
    /// Provider-assigned sheet id (the `gid` in Google Sheets URLs)
    pub id: i64,
    /// Hidden tabs are still readable
    pub hidden: bool,
}

/// Raw validation metadata attached to one cell, before interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellValidation {
    /// Cell carrying the rule
    pub cell: CellAddress,
    /// Provider condition type name, e.g. `ONE_OF_RANGE`
    pub condition_type: String,
    /// User-entered condition values, in order
    pub values: Vec<String>,
}

/// Access to an open spreadsheet.
///
/// Ranges passed to a provider are read on the given worksheet; any sheet name
/// carried by the [`RangeReference`] itself is ignored.
#[allow(async_fn_in_trait)]
pub trait SpreadsheetProvider {
    /// All worksheets, in tab order
    async fn list_worksheets(&self) -> Result<Vec<Worksheet>>;

    /// Look up a worksheet by exact title
    async fn worksheet(&self, title: &str) -> Result<Worksheet> {
        self.list_worksheets()
            .await?
            .into_iter()
            .find(|ws| ws.title == title)
            .ok_or_else(|| SweepError::NotFound(format!("worksheet '{}'", title)))
    }

    /// Read a rectangular range.
    ///
    /// Fails with [`SweepError::OutOfBounds`] when an explicit bound lies past
    /// the worksheet's grid. Trailing empty cells and rows may be omitted.
    async fn read_range(&self, ws: &Worksheet, range: &RangeReference) -> Result<Grid>;

    /// Read a single cell, `None` when it is empty
    async fn read_cell(&self, ws: &Worksheet, cell: CellAddress) -> Result<Option<String>> {
        let range = RangeReference {
            sheet: None,
            start: RangeBound::cell(cell),
            end: None,
        };
        let grid = self.read_range(ws, &range).await?;
        Ok(grid
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .filter(|v| !v.is_empty()))
    }

    /// Write a single cell as if typed by a user
    async fn write_cell(&self, ws: &Worksheet, cell: CellAddress, value: &str) -> Result<()>;

    /// Every value of a column from row 1 to its last non-empty row.
    ///
    /// Index `i` of the result holds row `i + 1`; blanks are empty strings.
    async fn read_column(&self, ws: &Worksheet, col: u32) -> Result<Vec<String>>;

    /// Every value of the worksheet's used area
    async fn read_all(&self, ws: &Worksheet) -> Result<Grid>;

    /// Data validation metadata for cells of `ws` that carry a rule
    async fn validation_metadata(&self, ws: &Worksheet) -> Result<Vec<CellValidation>>;

    /// Export `range` of `ws` to `dest` in `format`
    async fn export_range(
        &self,
        ws: &Worksheet,
        range: &RangeReference,
        format: ExportFormat,
        dest: &Path,
    ) -> Result<()>;
}

/// Write `grid` to `dest` on the blocking pool.
///
/// For providers that render CSV and XLSX locally from values they read.
pub async fn write_grid_file(format: ExportFormat, grid: Grid, dest: &Path) -> Result<()> {
    let dest: PathBuf = dest.to_path_buf();
    tokio::task::spawn_blocking(move || sheet_sweep_export::write_grid(format, &grid, &dest))
        .await
        .map_err(|e| SweepError::Export(format!("export task failed: {}", e)))??;
    Ok(())
}

/// Titles of the worksheets a user would pick from.
///
/// Hidden tabs are skipped unless every tab is hidden, in which case all
/// titles are returned.
pub async fn list_visible_worksheets<P: SpreadsheetProvider>(provider: &P) -> Result<Vec<String>> {
    let sheets = provider.list_worksheets().await?;
    let visible: Vec<String> = sheets
        .iter()
        .filter(|ws| !ws.hidden)
        .map(|ws| ws.title.clone())
        .collect();

    if visible.is_empty() {
        tracing::debug!("All {} worksheets are hidden, listing all of them", sheets.len());
        return Ok(sheets.into_iter().map(|ws| ws.title).collect());
    }
    Ok(visible)
}
