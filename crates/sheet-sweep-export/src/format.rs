//! Export formats

use std::fmt;
use std::str::FromStr;

/// File format of an exported range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Rendered by the spreadsheet provider
    Pdf,
    /// Excel workbook with one sheet
    Xlsx,
    /// Comma-separated values
    Csv,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    /// Whether the grid can be written without the provider's help
    pub fn is_local(&self) -> bool {
        !matches!(self, ExportFormat::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Xlsx => "Excel (XLSX)",
            ExportFormat::Csv => "CSV",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "xlsx" | "excel" | "excel (xlsx)" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!(
                "unknown export format '{other}' (expected pdf, xlsx or csv)"
            )),
        }
    }
}
