//! In-memory spreadsheet provider
//!
//! [`MemoryWorkbook`] behaves like a small Google spreadsheet: worksheets have
//! grid limits, reads past them fail with [`SweepError::OutOfBounds`], open-ended
//! ranges are clamped to the grid, and trailing blanks are omitted from reads.
//!
//! Recalculation is simulated with change hooks: writing a watched cell
//! schedules the hook to run after a latency, and any later call that reaches
//! the workbook after that deadline sees the recalculated cells.
//!
//! ```
//! use sheet_sweep::memory::MemoryWorkbook;
//!
//! let book = MemoryWorkbook::new();
//! book.add_sheet("Report");
//! book.set_value("Report", "B6", "Wing").unwrap();
//! assert_eq!(book.value("Report", "B6").as_deref(), Some("Wing"));
//! ```

use crate::error::{Result, SweepError};
use crate::provider::{write_grid_file, CellValidation, SpreadsheetProvider, Worksheet};
use sheet_sweep_core::{CellAddress, Grid, RangeReference};
use sheet_sweep_export::ExportFormat;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Default grid limits of a new worksheet, matching a fresh Google sheet
pub const DEFAULT_MAX_ROWS: u32 = 1000;
pub const DEFAULT_MAX_COLS: u32 = 26;

/// Recalculation hook: receives the value just written and the sheet to update
pub type RecalcHook = Arc<dyn Fn(&str, &mut MemorySheet) + Send + Sync>;

/// One worksheet of a [`MemoryWorkbook`]
#[derive(Debug, Clone)]
pub struct MemorySheet {
    title: String,
    id: i64,
    hidden: bool,
    max_rows: u32,
    max_cols: u32,
    /// Non-empty cells keyed by (row, col)
    cells: BTreeMap<(u32, u32), String>,
    validations: Vec<CellValidation>,
}

impl MemorySheet {
    fn new(title: &str, id: i64, hidden: bool) -> Self {
        Self {
            title: title.to_string(),
            id,
            hidden,
            max_rows: DEFAULT_MAX_ROWS,
            max_cols: DEFAULT_MAX_COLS,
            cells: BTreeMap::new(),
            validations: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Value of a cell, `None` when empty
    pub fn get(&self, cell: CellAddress) -> Option<&str> {
        self.cells.get(&(cell.row, cell.col)).map(String::as_str)
    }

    /// Set a cell; an empty value clears it
    pub fn set(&mut self, cell: CellAddress, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.cells.remove(&(cell.row, cell.col));
        } else {
            self.cells.insert((cell.row, cell.col), value);
        }
    }

    /// Clear every cell in the rectangle spanned by `from` and `to`
    pub fn clear(&mut self, from: CellAddress, to: CellAddress) {
        let (r0, r1) = (from.row.min(to.row), from.row.max(to.row));
        let (c0, c1) = (from.col.min(to.col), from.col.max(to.col));
        self.cells
            .retain(|&(row, col), _| !(row >= r0 && row <= r1 && col >= c0 && col <= c1));
    }

    fn worksheet(&self) -> Worksheet {
        Worksheet {
            title: self.title.clone(),
            id: self.id,
            hidden: self.hidden,
        }
    }

    fn out_of_bounds(&self, range: &RangeReference) -> SweepError {
        SweepError::OutOfBounds(format!(
            "Range ({}) exceeds grid limits. Max rows: {}, max columns: {}",
            range.qualified(&self.title),
            self.max_rows,
            self.max_cols
        ))
    }

    fn read_range(&self, range: &RangeReference) -> Result<Grid> {
        let start_row = range.start.row.unwrap_or(1);
        let end_row = match range.end {
            Some(end) => end.row.unwrap_or(self.max_rows),
            None => start_row,
        };
        let (r0, r1) = (start_row.min(end_row), start_row.max(end_row));
        let (c0, c1) = (
            range.start.col.min(range.end_col()),
            range.start.col.max(range.end_col()),
        );

        if r1 > self.max_rows || c1 > self.max_cols {
            return Err(self.out_of_bounds(range));
        }

        let mut grid: Grid = (r0..=r1)
            .map(|row| {
                let mut values: Vec<String> = (c0..=c1)
                    .map(|col| self.cells.get(&(row, col)).cloned().unwrap_or_default())
                    .collect();
                while values.last().is_some_and(|v| v.is_empty()) {
                    values.pop();
                }
                values
            })
            .collect();
        while grid.last().is_some_and(|row| row.is_empty()) {
            grid.pop();
        }
        Ok(grid)
    }

    fn read_column(&self, col: u32) -> Result<Vec<String>> {
        if col == 0 || col > self.max_cols {
            return Err(SweepError::OutOfBounds(format!(
                "column {} of '{}' exceeds grid limits. Max columns: {}",
                col, self.title, self.max_cols
            )));
        }
        let last = self
            .cells
            .keys()
            .filter(|(_, c)| *c == col)
            .map(|(r, _)| *r)
            .max()
            .unwrap_or(0);
        Ok((1..=last)
            .map(|row| self.cells.get(&(row, col)).cloned().unwrap_or_default())
            .collect())
    }

    fn read_all(&self) -> Grid {
        let last_row = self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0);
        let last_col = self.cells.keys().map(|(_, c)| *c).max().unwrap_or(0);
        (1..=last_row)
            .map(|row| {
                (1..=last_col)
                    .map(|col| self.cells.get(&(row, col)).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

struct ChangeHook {
    sheet: String,
    cell: CellAddress,
    latency: Duration,
    hook: RecalcHook,
}

struct PendingRecalc {
    due: Instant,
    sheet: String,
    value: String,
    hook: RecalcHook,
}

/// A write recorded by the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub sheet: String,
    pub cell: CellAddress,
    pub value: String,
}

#[derive(Default)]
struct State {
    sheets: Vec<MemorySheet>,
    next_id: i64,
    hooks: Vec<ChangeHook>,
    pending: Vec<PendingRecalc>,
    /// Scripted responses keyed by (sheet, range body)
    scripted: HashMap<(String, String), VecDeque<Grid>>,
    read_faults: HashMap<(String, String), usize>,
    write_faults: Vec<String>,
    disconnect_faults: Vec<String>,
    export_faults: Vec<String>,
    validation_faults: usize,
    writes: Vec<WriteRecord>,
    exports: Vec<PathBuf>,
}

impl State {
    fn sheet(&self, title: &str) -> Result<&MemorySheet> {
        self.sheets
            .iter()
            .find(|s| s.title == title)
            .ok_or_else(|| SweepError::NotFound(format!("worksheet '{}'", title)))
    }

    fn sheet_mut(&mut self, title: &str) -> Result<&mut MemorySheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.title == title)
            .ok_or_else(|| SweepError::NotFound(format!("worksheet '{}'", title)))
    }

    /// Apply recalculations whose deadline has passed, in scheduling order
    fn settle(&mut self) {
        let now = Instant::now();
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;
        for recalc in due {
            if let Some(sheet) = self.sheets.iter_mut().find(|s| s.title == recalc.sheet) {
                (recalc.hook)(&recalc.value, sheet);
            }
        }
    }
}

/// An in-memory spreadsheet implementing [`SpreadsheetProvider`]
#[derive(Default)]
pub struct MemoryWorkbook {
    state: Mutex<State>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a visible worksheet
    pub fn add_sheet(&self, title: &str) -> Worksheet {
        self.insert_sheet(title, false)
    }

    /// Add a hidden worksheet
    pub fn add_hidden_sheet(&self, title: &str) -> Worksheet {
        self.insert_sheet(title, true)
    }

    fn insert_sheet(&self, title: &str, hidden: bool) -> Worksheet {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        let sheet = MemorySheet::new(title, id, hidden);
        let ws = sheet.worksheet();
        state.sheets.push(sheet);
        ws
    }

    /// Change a worksheet's grid limits
    pub fn set_grid_limits(&self, sheet: &str, max_rows: u32, max_cols: u32) -> Result<()> {
        let mut state = self.lock();
        let sheet = state.sheet_mut(sheet)?;
        sheet.max_rows = max_rows;
        sheet.max_cols = max_cols;
        Ok(())
    }

    /// Set a cell directly, bypassing hooks and the write log
    pub fn set_value(&self, sheet: &str, cell: &str, value: &str) -> Result<()> {
        let cell = CellAddress::parse(cell)?;
        self.lock().sheet_mut(sheet)?.set(cell, value);
        Ok(())
    }

    /// Fill a column downwards starting at `top` (e.g. `AC2`)
    pub fn set_column<S: AsRef<str>>(&self, sheet: &str, top: &str, values: &[S]) -> Result<()> {
        let top = CellAddress::parse(top)?;
        let mut state = self.lock();
        let sheet = state.sheet_mut(sheet)?;
        for (offset, value) in values.iter().enumerate() {
            let cell = CellAddress {
                row: top.row + offset as u32,
                col: top.col,
            };
            sheet.set(cell, value.as_ref());
        }
        Ok(())
    }

    /// Current value of a cell, after any due recalculation
    pub fn value(&self, sheet: &str, cell: &str) -> Option<String> {
        let cell = CellAddress::parse(cell).ok()?;
        let mut state = self.lock();
        state.settle();
        state.sheet(sheet).ok()?.get(cell).map(str::to_string)
    }

    /// Attach a data validation rule to a cell
    pub fn add_validation<S: AsRef<str>>(
        &self,
        sheet: &str,
        cell: &str,
        condition_type: &str,
        values: &[S],
    ) -> Result<()> {
        let cell = CellAddress::parse(cell)?;
        self.lock().sheet_mut(sheet)?.validations.push(CellValidation {
            cell,
            condition_type: condition_type.to_string(),
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
        });
        Ok(())
    }

    /// Run `hook` `latency` after every write to `cell` of `sheet`
    pub fn on_change<F>(&self, sheet: &str, cell: &str, latency: Duration, hook: F) -> Result<()>
    where
        F: Fn(&str, &mut MemorySheet) + Send + Sync + 'static,
    {
        let cell = CellAddress::parse(cell)?;
        let mut state = self.lock();
        state.sheet(sheet)?;
        state.hooks.push(ChangeHook {
            sheet: sheet.to_string(),
            cell,
            latency,
            hook: Arc::new(hook),
        });
        Ok(())
    }

    /// Answer the next reads of `range` on `sheet` with these grids, in order
    pub fn script_reads(&self, sheet: &str, range: &str, grids: Vec<Grid>) -> Result<()> {
        let body = RangeReference::parse_literal(range)?.body();
        self.lock()
            .scripted
            .entry((sheet.to_string(), body))
            .or_default()
            .extend(grids);
        Ok(())
    }

    /// Fail the next `times` reads of `range` on `sheet`
    pub fn fail_reads(&self, sheet: &str, range: &str, times: usize) -> Result<()> {
        let body = RangeReference::parse_literal(range)?.body();
        *self
            .lock()
            .read_faults
            .entry((sheet.to_string(), body))
            .or_default() += times;
        Ok(())
    }

    /// Fail every write of exactly `value`
    pub fn fail_writes_of(&self, value: &str) {
        self.lock().write_faults.push(value.to_string());
    }

    /// Drop the connection on every write of exactly `value`
    pub fn disconnect_on_write_of(&self, value: &str) {
        self.lock().disconnect_faults.push(value.to_string());
    }

    /// Fail every export whose destination file is named `file_name`
    pub fn fail_exports_to(&self, file_name: &str) {
        self.lock().export_faults.push(file_name.to_string());
    }

    /// Fail the next `times` validation metadata requests
    pub fn fail_validation_reads(&self, times: usize) {
        self.lock().validation_faults += times;
    }

    /// Writes made through the provider interface, oldest first
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    /// Destinations of successful exports, oldest first
    pub fn exports(&self) -> Vec<PathBuf> {
        self.lock().exports.clone()
    }
}

impl SpreadsheetProvider for MemoryWorkbook {
    async fn list_worksheets(&self) -> Result<Vec<Worksheet>> {
        Ok(self.lock().sheets.iter().map(MemorySheet::worksheet).collect())
    }

    async fn read_range(&self, ws: &Worksheet, range: &RangeReference) -> Result<Grid> {
        let mut state = self.lock();
        state.settle();

        let key = (ws.title.clone(), range.body());
        if let Some(remaining) = state.read_faults.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SweepError::Read(format!(
                    "simulated failure reading {}",
                    range.qualified(&ws.title)
                )));
            }
        }
        if let Some(grid) = state.scripted.get_mut(&key).and_then(VecDeque::pop_front) {
            return Ok(grid);
        }

        state.sheet(&ws.title)?.read_range(range)
    }

    async fn write_cell(&self, ws: &Worksheet, cell: CellAddress, value: &str) -> Result<()> {
        let mut state = self.lock();
        state.settle();

        if state.disconnect_faults.iter().any(|v| v == value) {
            return Err(SweepError::Connection("simulated connection loss".into()));
        }
        if state.write_faults.iter().any(|v| v == value) {
            return Err(SweepError::Write(format!(
                "simulated failure writing '{}' to {}",
                value, cell
            )));
        }

        let sheet = state.sheet_mut(&ws.title)?;
        if cell.row > sheet.max_rows || cell.col > sheet.max_cols {
            return Err(SweepError::OutOfBounds(format!(
                "{} exceeds grid limits of '{}'",
                cell, ws.title
            )));
        }
        sheet.set(cell, value);

        state.writes.push(WriteRecord {
            sheet: ws.title.clone(),
            cell,
            value: value.to_string(),
        });

        let now = Instant::now();
        let scheduled: Vec<PendingRecalc> = state
            .hooks
            .iter()
            .filter(|h| h.sheet == ws.title && h.cell == cell)
            .map(|h| PendingRecalc {
                due: now + h.latency,
                sheet: h.sheet.clone(),
                value: value.to_string(),
                hook: Arc::clone(&h.hook),
            })
            .collect();
        state.pending.extend(scheduled);
        Ok(())
    }

    async fn read_column(&self, ws: &Worksheet, col: u32) -> Result<Vec<String>> {
        let mut state = self.lock();
        state.settle();
        state.sheet(&ws.title)?.read_column(col)
    }

    async fn read_all(&self, ws: &Worksheet) -> Result<Grid> {
        let mut state = self.lock();
        state.settle();
        Ok(state.sheet(&ws.title)?.read_all())
    }

    async fn validation_metadata(&self, ws: &Worksheet) -> Result<Vec<CellValidation>> {
        let mut state = self.lock();
        if state.validation_faults > 0 {
            state.validation_faults -= 1;
            return Err(SweepError::Read("simulated metadata failure".into()));
        }
        Ok(state.sheet(&ws.title)?.validations.clone())
    }

    async fn export_range(
        &self,
        ws: &Worksheet,
        range: &RangeReference,
        format: ExportFormat,
        dest: &Path,
    ) -> Result<()> {
        let grid = {
            let mut state = self.lock();
            state.settle();

            let file_name = dest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if state.export_faults.iter().any(|f| *f == file_name) {
                return Err(SweepError::Export(format!(
                    "simulated failure exporting {}",
                    file_name
                )));
            }
            state.sheet(&ws.title)?.read_range(range)?
        };

        write_grid_file(format, grid, dest).await?;
        self.lock().exports.push(dest.to_path_buf());
        Ok(())
    }
}
