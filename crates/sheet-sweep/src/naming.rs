//! Output file naming

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sheet_sweep_export::ExportFormat;
use std::fmt;
use std::str::FromStr;

/// How each exported file is named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// The sanitised dropdown value, e.g. `Wing_Assembly.pdf`
    #[default]
    Dropdown,
    /// `Report_<n>.<ext>` with `n` counting from 1
    Sequential,
    /// `<YYYYMMDD_HHMMSS>_<n>.<ext>`
    Timestamp,
}

impl fmt::Display for NamingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamingMode::Dropdown => "dropdown",
            NamingMode::Sequential => "sequential",
            NamingMode::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

impl FromStr for NamingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dropdown" | "value" => Ok(NamingMode::Dropdown),
            "sequential" | "numbered" => Ok(NamingMode::Sequential),
            "timestamp" => Ok(NamingMode::Timestamp),
            other => Err(format!(
                "unknown naming mode '{}' (expected dropdown, sequential or timestamp)",
                other
            )),
        }
    }
}

/// Keep letters, digits, space, `_` and `-`; trim; turn spaces into `_`
pub fn sanitize(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    kept.trim().replace(' ', "_")
}

/// File name for the `index`-th value (1-based).
///
/// A dropdown value that sanitises to nothing falls back to the sequential
/// name.
pub fn file_name(
    mode: NamingMode,
    value: &str,
    index: usize,
    format: ExportFormat,
    now: &DateTime<Local>,
) -> String {
    let ext = format.extension();
    match mode {
        NamingMode::Dropdown => {
            let stem = sanitize(value);
            if stem.is_empty() {
                format!("Report_{}.{}", index, ext)
            } else {
                format!("{}.{}", stem, ext)
            }
        }
        NamingMode::Sequential => format!("Report_{}.{}", index, ext),
        NamingMode::Timestamp => format!("{}_{}.{}", now.format("%Y%m%d_%H%M%S"), index, ext),
    }
}

/// `name` with `_<index>` inserted before its extension
pub fn with_suffix(name: &str, index: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, index, ext),
        None => format!("{}_{}", name, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Wing Assembly"), "Wing_Assembly");
        assert_eq!(sanitize("  A/B: test?  "), "AB_test");
        assert_eq!(sanitize("part-7_rev"), "part-7_rev");
        assert_eq!(sanitize("Ünïcode"), "Ünïcode");
        assert_eq!(sanitize("///"), "");
    }

    #[test]
    fn test_file_names() {
        let now = noon();
        assert_eq!(
            file_name(NamingMode::Dropdown, "Wing Assembly", 1, ExportFormat::Pdf, &now),
            "Wing_Assembly.pdf"
        );
        assert_eq!(
            file_name(NamingMode::Sequential, "Wing", 3, ExportFormat::Csv, &now),
            "Report_3.csv"
        );
        assert_eq!(
            file_name(NamingMode::Timestamp, "Wing", 2, ExportFormat::Xlsx, &now),
            "20240305_140709_2.xlsx"
        );
        assert_eq!(
            file_name(NamingMode::Dropdown, "???", 4, ExportFormat::Pdf, &now),
            "Report_4.pdf"
        );
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(with_suffix("AB.csv", 2), "AB_2.csv");
        assert_eq!(with_suffix("v1.2.pdf", 7), "v1.2_7.pdf");
        assert_eq!(with_suffix("plain", 3), "plain_3");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Sequential".parse::<NamingMode>(), Ok(NamingMode::Sequential));
        assert_eq!("value".parse::<NamingMode>(), Ok(NamingMode::Dropdown));
        assert!("random".parse::<NamingMode>().is_err());
    }
}
