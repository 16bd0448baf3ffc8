//! Job settings
//!
//! [`JobSettings`] is the loose, user-facing form (strings, as written in a
//! job file or on the command line). [`JobSettings::parse`] validates it into
//! a [`JobConfig`] before a run starts, so a bad cell address never surfaces
//! halfway through a batch.

use crate::error::{Result, SweepError};
use crate::naming::NamingMode;
use serde::{Deserialize, Serialize};
use sheet_sweep_core::{
    column_to_index, CellAddress, Error as CoreError, RangeBound, RangeReference,
    DEFAULT_ROW_CEILING,
};
use sheet_sweep_export::ExportFormat;
use std::path::PathBuf;
use std::time::Duration;

/// Job settings as written by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobSettings {
    /// Worksheet holding the dropdown and the report
    pub sheet: String,
    /// Dropdown cell driving the report
    pub driving_cell: String,
    /// Optional cell whose value is logged before a run (e.g. a menu name)
    pub label_cell: Option<String>,
    /// Top-left cell of the exported block
    pub data_start: String,
    /// Last exported column
    pub end_column: String,
    /// Column scanned for the last filled row
    pub check_column: String,
    /// Lowest row the scan considers
    pub max_row: u32,
    /// Range watched for recalculation
    pub sentinel: String,
    /// Seconds to wait for the sentinel to change
    pub timeout_secs: u64,
    /// Directory receiving exported files
    pub output_dir: PathBuf,
    /// `pdf`, `xlsx` or `csv`
    pub format: String,
    /// `dropdown`, `sequential` or `timestamp`
    pub naming: String,
    /// Row closing open-ended source ranges
    pub row_ceiling: u32,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            sheet: "Extra Component Report".to_string(),
            driving_cell: "B6".to_string(),
            label_cell: Some("B3".to_string()),
            data_start: "A9".to_string(),
            end_column: "I".to_string(),
            check_column: "B".to_string(),
            max_row: 73,
            sentinel: "B9:B17".to_string(),
            timeout_secs: 10,
            output_dir: PathBuf::from("downloads"),
            format: "pdf".to_string(),
            naming: "dropdown".to_string(),
            row_ceiling: DEFAULT_ROW_CEILING,
        }
    }
}

impl JobSettings {
    /// Validate every field into a [`JobConfig`]
    pub fn parse(&self) -> Result<JobConfig> {
        let sheet = self.sheet.trim();
        if sheet.is_empty() {
            return Err(invalid("sheet name is empty"));
        }

        let driving_cell = CellAddress::parse(&self.driving_cell)?;
        let label_cell = match self.label_cell.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(cell) => Some(CellAddress::parse(cell)?),
        };
        let data_start = CellAddress::parse(&self.data_start)?;
        let end_column = column_to_index(self.end_column.trim())?;
        let check_column = column_to_index(self.check_column.trim())?;

        if end_column < data_start.col {
            return Err(invalid(format!(
                "end column {} is left of the data start {}",
                self.end_column.trim(),
                data_start
            )));
        }
        if self.max_row < data_start.row {
            return Err(invalid(format!(
                "max row {} is above the data start {}",
                self.max_row, data_start
            )));
        }
        if self.row_ceiling == 0 {
            return Err(invalid("row ceiling must be at least 1"));
        }

        let sentinel = RangeReference::parse_with_ceiling(&self.sentinel, self.row_ceiling)?;
        if let Some(other) = sentinel.sheet.as_deref().filter(|s| *s != sheet) {
            return Err(invalid(format!(
                "sentinel range must be on '{}', not '{}'",
                sheet, other
            )));
        }

        let format: ExportFormat = self.format.parse().map_err(invalid)?;
        let naming: NamingMode = self.naming.parse().map_err(invalid)?;

        Ok(JobConfig {
            sheet: sheet.to_string(),
            driving_cell,
            label_cell,
            data_start,
            end_column,
            check_column,
            max_row: self.max_row,
            sentinel,
            timeout: Duration::from_secs(self.timeout_secs),
            output_dir: self.output_dir.clone(),
            format,
            naming,
            row_ceiling: self.row_ceiling,
        })
    }
}

fn invalid(msg: impl Into<String>) -> SweepError {
    SweepError::InvalidInput(CoreError::invalid_input(msg))
}

/// Validated job configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub sheet: String,
    pub driving_cell: CellAddress,
    pub label_cell: Option<CellAddress>,
    pub data_start: CellAddress,
    pub end_column: u32,
    pub check_column: u32,
    pub max_row: u32,
    pub sentinel: RangeReference,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub naming: NamingMode,
    pub row_ceiling: u32,
}

impl JobConfig {
    /// Block exported for a report whose data ends at `last_row`
    pub fn export_range(&self, last_row: u32) -> RangeReference {
        RangeReference {
            sheet: None,
            start: RangeBound::cell(self.data_start),
            end: Some(RangeBound {
                col: self.end_column,
                row: Some(last_row.max(self.data_start.row)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_parse() {
        let job = JobSettings::default().parse().unwrap();
        assert_eq!(job.sheet, "Extra Component Report");
        assert_eq!(job.driving_cell.to_string(), "B6");
        assert_eq!(job.label_cell.map(|c| c.to_string()).as_deref(), Some("B3"));
        assert_eq!(job.end_column, 9);
        assert_eq!(job.check_column, 2);
        assert_eq!(job.sentinel.body(), "B9:B17");
        assert_eq!(job.timeout, Duration::from_secs(10));
        assert_eq!(job.format, ExportFormat::Pdf);
        assert_eq!(job.naming, NamingMode::Dropdown);
    }

    #[test]
    fn test_export_range() {
        let job = JobSettings::default().parse().unwrap();
        assert_eq!(job.export_range(42).body(), "A9:I42");
        assert_eq!(job.export_range(3).body(), "A9:I9");
    }

    #[test]
    fn test_rejects_bad_settings() {
        let bad = |f: fn(&mut JobSettings)| {
            let mut settings = JobSettings::default();
            f(&mut settings);
            settings.parse().unwrap_err()
        };

        assert!(bad(|s| s.driving_cell = "6B".into()).is_fatal());
        assert!(bad(|s| s.end_column = "".into()).is_fatal());
        assert!(bad(|s| s.data_start = "J9".into()).is_fatal());
        assert!(bad(|s| s.max_row = 5).is_fatal());
        assert!(bad(|s| s.format = "docx".into()).is_fatal());
        assert!(bad(|s| s.naming = "random".into()).is_fatal());
        assert!(bad(|s| s.sentinel = "Other!B9:B17".into()).is_fatal());
        assert!(bad(|s| s.sheet = "  ".into()).is_fatal());
    }

    #[test]
    fn test_blank_label_cell_is_none() {
        let settings = JobSettings {
            label_cell: Some(" ".into()),
            ..JobSettings::default()
        };
        assert_eq!(settings.parse().unwrap().label_cell, None);
    }
}
