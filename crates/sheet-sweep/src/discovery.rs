//! Dropdown discovery from data validation metadata

use crate::error::Result;
use crate::provider::{SpreadsheetProvider, Worksheet};
use crate::resolver::resolve_range_values;
use sheet_sweep_core::{CellAddress, DropdownValues, ValidationKind, ValidationRule};

/// Every validation rule on `ws`, interpreted
pub async fn find_validation_rules<P: SpreadsheetProvider>(
    provider: &P,
    ws: &Worksheet,
    row_ceiling: u32,
) -> Result<Vec<ValidationRule>> {
    let raw = provider.validation_metadata(ws).await?;
    let rules: Vec<ValidationRule> = raw
        .iter()
        .map(|v| ValidationRule::from_condition(v.cell, &v.condition_type, &v.values, row_ceiling))
        .collect();

    for rule in &rules {
        tracing::debug!(
            "Validation at {}: {:?} {}",
            rule.cell,
            rule.kind,
            rule.source.as_deref().unwrap_or("")
        );
    }
    tracing::debug!("Found {} validation rules on '{}'", rules.len(), ws.title);
    Ok(rules)
}

/// The rule attached to exactly `cell`, if it carries a usable range
pub fn find_rule_for_cell(rules: &[ValidationRule], cell: CellAddress) -> Option<&ValidationRule> {
    rules.iter().find(|r| r.cell == cell).filter(|r| r.has_range())
}

/// Values offered by the dropdown at `cell`.
///
/// Range-backed dropdowns are resolved through [`resolve_range_values`]; inline
/// lists are returned as entered. A cell with no usable rule, or metadata that
/// cannot be read, yields no values.
pub async fn load_dropdown_values<P: SpreadsheetProvider>(
    provider: &P,
    ws: &Worksheet,
    cell: CellAddress,
    row_ceiling: u32,
) -> Result<DropdownValues> {
    tracing::info!("Reading dropdown from cell {}", cell);

    let rules = match find_validation_rules(provider, ws, row_ceiling).await {
        Ok(rules) => rules,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            tracing::warn!("Could not read validation rules of '{}': {}", ws.title, e);
            return Ok(DropdownValues::default());
        }
    };

    if let Some(rule) = find_rule_for_cell(&rules, cell) {
        if let Some(range) = &rule.source_range {
            tracing::info!("Dropdown source range: {}", range);
            return resolve_range_values(provider, range, ws, row_ceiling).await;
        }
    }

    if let Some(rule) = rules
        .iter()
        .find(|r| r.cell == cell && r.kind == ValidationKind::OneOfList)
    {
        let values = DropdownValues::collect(&rule.list_values);
        tracing::info!("Dropdown lists {} inline values", values.len());
        return Ok(values);
    }

    match rules.iter().find(|r| r.cell == cell) {
        Some(rule) => tracing::warn!(
            "Validation at {} has no usable source ({:?})",
            cell,
            rule.kind
        ),
        None => {
            tracing::warn!("No data validation found for cell {}", cell);
            let cells: Vec<String> = rules.iter().map(|r| r.cell.to_string()).collect();
            tracing::debug!("Cells with validation: {}", cells.join(", "));
        }
    }
    Ok(DropdownValues::default())
}
