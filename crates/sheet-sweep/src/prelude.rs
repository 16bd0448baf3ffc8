//! Prelude module - common imports for sheet-sweep users
//!
//! ```rust
//! use sheet_sweep::prelude::*;
//! ```

pub use crate::{
    // Engine
    find_last_row_backward,
    list_visible_worksheets,
    load_dropdown_values,
    resolve_range_values,
    wait_for_change,
    BatchRunner,
    CancelFlag,
    RunState,
    RunSummary,

    // Configuration
    JobConfig,
    JobSettings,
    NamingMode,

    // Providers
    MemoryWorkbook,
    SpreadsheetProvider,
    Worksheet,

    // Data types
    CellAddress,
    DropdownValues,
    ExportFormat,
    RangeReference,
    DEFAULT_ROW_CEILING,

    // Errors
    Result,
    SweepError,
};
