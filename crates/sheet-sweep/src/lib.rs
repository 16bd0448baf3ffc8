//! # sheet-sweep
//!
//! Batch export of dropdown-driven spreadsheet reports.
//!
//! A report sheet has a dropdown cell whose value drives formulas that fill a
//! data block below it. sheet-sweep walks every value the dropdown accepts,
//! lets the sheet recalculate, measures the filled block and exports it.
//!
//! ## Components
//!
//! - [`provider`] - the [`SpreadsheetProvider`] trait every backend implements
//! - [`discovery`] - finds the dropdown's validation rule and its values
//! - [`resolver`] - reads (possibly cross-sheet) source ranges with fallbacks
//! - [`poller`] - waits for a sentinel range to change after a write
//! - [`scanner`] - finds the last filled row of the data block
//! - [`batch`] - runs a job over every value and restores the dropdown
//! - [`memory`] - an in-memory provider for tests and dry runs
//!
//! ## Example
//!
//! ```rust
//! use sheet_sweep::prelude::*;
//!
//! # async fn demo() -> sheet_sweep::Result<()> {
//! let book = MemoryWorkbook::new();
//! let report = book.add_sheet("Report");
//! book.add_validation("Report", "B6", "ONE_OF_LIST", &["Wing", "Tail"])?;
//!
//! let cell = CellAddress::parse("B6")?;
//! let values = load_dropdown_values(&book, &report, cell, DEFAULT_ROW_CEILING).await?;
//! assert_eq!(values.as_slice(), ["Wing", "Tail"]);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod discovery;
pub mod error;
pub mod job;
pub mod memory;
pub mod naming;
pub mod poller;
pub mod prelude;
pub mod provider;
pub mod resolver;
pub mod scanner;

pub use batch::{BatchRunner, CancelFlag, Outcome, ProcessingResult, RunState, RunSummary};
pub use discovery::{find_rule_for_cell, find_validation_rules, load_dropdown_values};
pub use error::{Result, SweepError};
pub use job::{JobConfig, JobSettings};
pub use memory::MemoryWorkbook;
pub use naming::NamingMode;
pub use poller::{wait_for_change, POLL_INTERVAL};
pub use provider::{
    list_visible_worksheets, write_grid_file, CellValidation, SpreadsheetProvider, Worksheet,
};
pub use resolver::{read_range_with_fallback, resolve_range_values, ReadStrategy};
pub use scanner::find_last_row_backward;

// Re-export the data types callers need alongside the engine
pub use sheet_sweep_core::{
    CellAddress, DropdownValues, Grid, RangeReference, Snapshot, ValidationKind, ValidationRule,
    DEFAULT_ROW_CEILING,
};
pub use sheet_sweep_export::ExportFormat;
