//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "B6")
//! - [`column_to_index`] / [`index_to_column`] - Column letter conversion

mod address;

pub use address::{column_to_index, index_to_column, CellAddress};
