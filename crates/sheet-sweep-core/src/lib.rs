//! # sheet-sweep-core
//!
//! Core data types for the sheet-sweep report automation tools.
//!
//! This crate provides the fundamental types used throughout sheet-sweep:
//! - [`CellAddress`] and column conversion ([`column_to_index`], [`index_to_column`])
//! - [`RangeReference`] - Sheet-qualified ranges, including open-ended ones like `AC2:AC`
//! - [`ValidationRule`] - Data validation attached to a cell
//! - [`Grid`], [`Snapshot`] and [`DropdownValues`] - Values read back from a sheet
//!
//! ## Example
//!
//! ```rust
//! use sheet_sweep_core::{CellAddress, RangeReference};
//!
//! let cell = CellAddress::parse("B6").unwrap();
//! assert_eq!(cell.to_string(), "B6");
//!
//! let source = RangeReference::parse("=Backend!$AC$2:$AC").unwrap();
//! assert_eq!(source.sheet_or("Report"), "Backend");
//! assert_eq!(source.body(), "AC2:AC1000");
//! ```

pub mod cell;
pub mod error;
pub mod grid;
pub mod reference;
pub mod validation;

// Re-exports for convenience
pub use cell::{column_to_index, index_to_column, CellAddress};
pub use error::{Error, Result};
pub use grid::{DropdownValues, Grid, Snapshot};
pub use reference::{quote_sheet_name, RangeBound, RangeReference, DEFAULT_ROW_CEILING};
pub use validation::{ValidationKind, ValidationRule};
