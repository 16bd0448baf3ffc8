//! Resolving range references to values
//!
//! A dropdown's source range may live on another (often hidden) worksheet and
//! may be written in ways the provider rejects once the ceiling row lies past
//! the sheet's grid. Reads therefore go through a ladder of strategies that
//! only kicks in after a grid-limit failure.

use crate::error::Result;
use crate::provider::{SpreadsheetProvider, Worksheet};
use sheet_sweep_core::{DropdownValues, Grid, RangeReference};

/// One way of reading a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// The range exactly as given
    Literal,
    /// Whole-column range (`A:A`) limited to rows `1..=ceiling`
    ColumnRows,
    /// Open-ended range (`A2:A`) closed at the ceiling
    OpenEndRows,
    /// Whole used area, projected onto the range's start column
    SheetColumn,
}

/// Strategies tried, in order, after the literal read exceeds grid limits
pub const FALLBACK_LADDER: [ReadStrategy; 3] = [
    ReadStrategy::ColumnRows,
    ReadStrategy::OpenEndRows,
    ReadStrategy::SheetColumn,
];

impl ReadStrategy {
    /// Whether the strategy has anything to try for `range`
    pub fn applies_to(self, range: &RangeReference) -> bool {
        match self {
            ReadStrategy::Literal => true,
            ReadStrategy::ColumnRows => range.is_columns_only(),
            ReadStrategy::OpenEndRows => range.has_open_end() && !range.is_columns_only(),
            ReadStrategy::SheetColumn => range.end.is_some(),
        }
    }

    /// The range the strategy asks the provider for; `None` for a full-sheet read
    pub fn rewrite(self, range: &RangeReference, ceiling: u32) -> Option<RangeReference> {
        match self {
            ReadStrategy::Literal => Some(range.clone()),
            ReadStrategy::ColumnRows => Some(range.with_rows(Some(1), Some(ceiling))),
            ReadStrategy::OpenEndRows => Some(range.with_rows(None, Some(ceiling))),
            ReadStrategy::SheetColumn => None,
        }
    }

    async fn attempt<P: SpreadsheetProvider>(
        self,
        provider: &P,
        ws: &Worksheet,
        range: &RangeReference,
        ceiling: u32,
    ) -> Result<Grid> {
        match self.rewrite(range, ceiling) {
            Some(rewritten) => {
                if self != ReadStrategy::Literal {
                    tracing::debug!("Trying limited range: {}", rewritten.body());
                }
                provider.read_range(ws, &rewritten).await
            }
            None => {
                tracing::debug!("Reading all values of '{}' and filtering", ws.title);
                let all = provider.read_all(ws).await?;
                Ok(project_column(&all, range.start.col))
            }
        }
    }
}

/// Single-column grid of the non-empty values in column `col` (1-based)
pub fn project_column(grid: &Grid, col: u32) -> Grid {
    let idx = col.saturating_sub(1) as usize;
    grid.iter()
        .filter_map(|row| row.get(idx))
        .filter(|v| !v.is_empty())
        .map(|v| vec![v.clone()])
        .collect()
}

/// Read `range` from `ws`, falling back through [`FALLBACK_LADDER`] when the
/// literal read exceeds grid limits.
///
/// Any other read failure, or every strategy failing, yields an empty grid.
/// Only errors that end the run are returned.
pub async fn read_range_with_fallback<P: SpreadsheetProvider>(
    provider: &P,
    ws: &Worksheet,
    range: &RangeReference,
    ceiling: u32,
) -> Result<Grid> {
    match ReadStrategy::Literal.attempt(provider, ws, range, ceiling).await {
        Ok(grid) => return Ok(grid),
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) if !e.is_out_of_bounds() => {
            tracing::warn!("Could not read range {}: {}", range.qualified(&ws.title), e);
            return Ok(Grid::new());
        }
        Err(_) => {
            tracing::info!(
                "Range {} exceeds limits, trying fallback strategies",
                range.qualified(&ws.title)
            );
        }
    }

    for strategy in FALLBACK_LADDER.into_iter().filter(|s| s.applies_to(range)) {
        match strategy.attempt(provider, ws, range, ceiling).await {
            Ok(grid) => {
                tracing::debug!("{:?} returned {} rows", strategy, grid.len());
                return Ok(grid);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => tracing::debug!("{:?} failed: {}", strategy, e),
        }
    }

    tracing::warn!("Could not read range: {}", range.qualified(&ws.title));
    Ok(Grid::new())
}

/// Resolve a reference to its de-duplicated values.
///
/// A reference without a sheet is read from `default_ws`. A named sheet that
/// does not exist resolves to no values.
pub async fn resolve_range_values<P: SpreadsheetProvider>(
    provider: &P,
    range: &RangeReference,
    default_ws: &Worksheet,
    ceiling: u32,
) -> Result<DropdownValues> {
    let ws = match &range.sheet {
        None => default_ws.clone(),
        Some(name) if *name == default_ws.title => default_ws.clone(),
        Some(name) => match provider.worksheet(name).await {
            Ok(ws) => ws,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!("Could not open sheet '{}': {}", name, e);
                return Ok(DropdownValues::default());
            }
        },
    };

    if ws.hidden {
        tracing::debug!("Reading from hidden sheet '{}'", ws.title);
    }
    tracing::debug!("Reading range {} from '{}'", range.body(), ws.title);

    let grid = read_range_with_fallback(provider, &ws, range, ceiling).await?;
    let values = DropdownValues::from_grid(&grid);
    tracing::info!("Found {} unique values in {}", values.len(), range.qualified(&ws.title));
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWorkbook;
    use pretty_assertions::assert_eq;
    use sheet_sweep_core::DEFAULT_ROW_CEILING;

    fn literal(s: &str) -> RangeReference {
        RangeReference::parse_literal(s).unwrap()
    }

    #[test]
    fn test_strategy_applicability() {
        let whole = literal("A:A");
        let open = literal("A2:A");
        let closed = literal("A2:A10");
        let single = literal("A2");

        assert!(ReadStrategy::ColumnRows.applies_to(&whole));
        assert!(!ReadStrategy::OpenEndRows.applies_to(&whole));
        assert!(ReadStrategy::OpenEndRows.applies_to(&open));
        assert!(!ReadStrategy::ColumnRows.applies_to(&open));
        assert!(!ReadStrategy::ColumnRows.applies_to(&closed));
        assert!(!ReadStrategy::OpenEndRows.applies_to(&closed));
        assert!(ReadStrategy::SheetColumn.applies_to(&closed));
        assert!(!ReadStrategy::SheetColumn.applies_to(&single));
    }

    #[test]
    fn test_strategy_rewrites() {
        assert_eq!(
            ReadStrategy::ColumnRows.rewrite(&literal("AC:AC"), 1000).unwrap().body(),
            "AC1:AC1000"
        );
        assert_eq!(
            ReadStrategy::OpenEndRows.rewrite(&literal("AC2:AC"), 500).unwrap().body(),
            "AC2:AC500"
        );
        assert_eq!(ReadStrategy::SheetColumn.rewrite(&literal("A1:A2"), 10), None);
    }

    #[test]
    fn test_project_column_drops_blanks() {
        let grid: Grid = vec![
            vec!["h".into(), "Wing".into()],
            vec!["x".into()],
            vec!["".into(), "".into()],
            vec!["".into(), "Tail".into()],
        ];
        assert_eq!(
            project_column(&grid, 2),
            vec![vec!["Wing".to_string()], vec!["Tail".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_ceiling_past_grid_falls_back_to_sheet_column() {
        let book = MemoryWorkbook::new();
        let report = book.add_sheet("Report");
        book.add_hidden_sheet("Backend");
        book.set_grid_limits("Backend", 50, 30).unwrap();
        book.set_column("Backend", "AC1", &["Header", "Wing", "Wing", "Tail"]).unwrap();

        let range = RangeReference::parse("=Backend!$AC$2:$AC").unwrap();
        assert_eq!(range.body(), "AC2:AC1000");

        let values = resolve_range_values(&book, &range, &report, DEFAULT_ROW_CEILING)
            .await
            .unwrap();
        // The projection reads the whole column, header included
        assert_eq!(values.as_slice(), ["Header", "Wing", "Tail"]);
    }

    #[tokio::test]
    async fn test_plain_read_failure_skips_ladder() {
        let book = MemoryWorkbook::new();
        let ws = book.add_sheet("Data");
        book.set_column("Data", "A1", &["a", "b"]).unwrap();
        book.fail_reads("Data", "A:A", 1).unwrap();

        // A plain read failure does not trigger the ladder
        let grid = read_range_with_fallback(&book, &ws, &literal("A:A"), 1000).await.unwrap();
        assert!(grid.is_empty());

        let grid = read_range_with_fallback(&book, &ws, &literal("A:A"), 1000).await.unwrap();
        assert_eq!(grid, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[tokio::test]
    async fn test_missing_sheet_resolves_empty() {
        let book = MemoryWorkbook::new();
        let report = book.add_sheet("Report");
        let range = RangeReference::parse("=Gone!A1:A5").unwrap();
        let values = resolve_range_values(&book, &range, &report, DEFAULT_ROW_CEILING)
            .await
            .unwrap();
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_unqualified_range_uses_default_sheet() {
        let book = MemoryWorkbook::new();
        let report = book.add_sheet("Report");
        book.set_column("Report", "D1", &["x", "y", "x"]).unwrap();
        let range = RangeReference::parse("D1:D3").unwrap();
        let values = resolve_range_values(&book, &range, &report, DEFAULT_ROW_CEILING)
            .await
            .unwrap();
        assert_eq!(values.as_slice(), ["x", "y"]);
    }
}
