//! Sheets API payloads.
//!
//! Only the fields this crate reads are modelled; everything else in the
//! responses is ignored.

use serde::{Deserialize, Serialize};
use sheet_sweep::{CellValidation, Worksheet};
use sheet_sweep_core::{CellAddress, Grid};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMeta {
    pub properties: SheetProperties,
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub hidden: bool,
}

impl From<&SheetProperties> for Worksheet {
    fn from(p: &SheetProperties) -> Self {
        Worksheet {
            title: p.title.clone(),
            id: p.sheet_id,
            hidden: p.hidden,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    /// Zero-based row of the first entry in `row_data`
    #[serde(default)]
    pub start_row: u32,
    /// Zero-based column of the first entry of each row
    #[serde(default)]
    pub start_column: u32,
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub data_validation: Option<DataValidationRule>,
}

#[derive(Debug, Deserialize)]
pub struct DataValidationRule {
    pub condition: Option<BooleanCondition>,
}

#[derive(Debug, Deserialize)]
pub struct BooleanCondition {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub values: Vec<ConditionValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionValue {
    pub user_entered_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetResponse {
    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub value_input_option: &'static str,
    pub data: Vec<ValueRange>,
}

/// Cells as strings; numbers and booleans keep their JSON spelling
pub fn values_to_grid(values: Vec<Vec<serde_json::Value>>) -> Grid {
    values
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect()
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Cells of `sheet` carrying a validation rule, in row-major order
pub fn collect_validations(sheet: &SheetMeta) -> Vec<CellValidation> {
    let mut found = Vec::new();
    for block in &sheet.data {
        for (r, row) in block.row_data.iter().enumerate() {
            for (c, cell) in row.values.iter().enumerate() {
                let Some(rule) = cell.data_validation.as_ref() else {
                    continue;
                };
                // A rule without a condition is kept with an empty type
                let (condition_type, values) = match &rule.condition {
                    Some(condition) => (
                        condition.kind.clone(),
                        condition
                            .values
                            .iter()
                            .map(|v| v.user_entered_value.clone().unwrap_or_default())
                            .collect(),
                    ),
                    None => (String::new(), Vec::new()),
                };
                found.push(CellValidation {
                    cell: CellAddress {
                        row: block.start_row + r as u32 + 1,
                        col: block.start_column + c as u32 + 1,
                    },
                    condition_type,
                    values,
                });
            }
        }
    }
    found
}
