//! Last-row detection on a check column

use crate::error::Result;
use crate::provider::{SpreadsheetProvider, Worksheet};

/// Last row in `start_row..=max_row` whose value in `column` is non-blank.
///
/// `column[i]` holds row `i + 1`; rows past the end of `column` are blank.
/// Scans upwards from `max_row` and returns `start_row` when every row in the
/// window is blank. Interior blanks are not looked at, so data with gaps is
/// measured to its lowest filled row.
pub fn last_row_backward(column: &[String], start_row: u32, max_row: u32) -> u32 {
    let top = max_row.min(column.len() as u32);
    (start_row.max(1)..=top)
        .rev()
        .find(|&row| !column[(row - 1) as usize].trim().is_empty())
        .unwrap_or(start_row)
}

/// Read `check_col` of `ws` and find its last filled row in the window.
///
/// A failed column read is returned as an error rather than falling back to
/// `start_row`, so the batch records the value as failed instead of exporting
/// a block of unknown height.
pub async fn find_last_row_backward<P: SpreadsheetProvider>(
    provider: &P,
    ws: &Worksheet,
    check_col: u32,
    start_row: u32,
    max_row: u32,
) -> Result<u32> {
    let column = provider.read_column(ws, check_col).await?;
    let last = last_row_backward(&column, start_row, max_row);
    tracing::debug!(
        "Last data row in column {} between {} and {}: {}",
        check_col,
        start_row,
        max_row,
        last
    );
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn column(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_finds_last_filled_row() {
        let col = column(&["", "", "x", "y", "", ""]);
        assert_eq!(last_row_backward(&col, 1, 6), 4);
    }

    #[test]
    fn test_interior_blank_is_measured_to_lowest_filled_row() {
        let col = column(&["", "a", "", "b", "", ""]);
        assert_eq!(last_row_backward(&col, 2, 6), 4);
    }

    #[test]
    fn test_stray_value_below_block_extends_range() {
        // Rows 2-3 are the block; row 6 is unrelated but inside the window
        let col = column(&["", "a", "b", "", "", "note"]);
        assert_eq!(last_row_backward(&col, 2, 6), 6);
        assert_eq!(last_row_backward(&col, 2, 5), 3);
    }

    #[tokio::test]
    async fn test_read_failure_is_an_error() {
        let book = crate::memory::MemoryWorkbook::new();
        let ws = book.add_sheet("Report");
        book.set_grid_limits("Report", 100, 3).unwrap();

        let err = find_last_row_backward(&book, &ws, 9, 9, 73).await.unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_window_limits() {
        let col = column(&["h", "", "", "a", "b", "c", "d"]);
        assert_eq!(last_row_backward(&col, 4, 5), 5);
        assert_eq!(last_row_backward(&col, 2, 3), 2);
        assert_eq!(last_row_backward(&col, 9, 73), 9);
    }

    #[test]
    fn test_whitespace_is_blank() {
        let col = column(&["a", "  ", "\t"]);
        assert_eq!(last_row_backward(&col, 1, 73), 1);
    }

    #[test]
    fn test_short_column_and_empty_window() {
        assert_eq!(last_row_backward(&[], 9, 73), 9);
        let col = column(&["a", "b"]);
        assert_eq!(last_row_backward(&col, 1, 73), 2);
        assert_eq!(last_row_backward(&col, 5, 3), 5);
    }

    proptest! {
        #[test]
        fn prop_result_in_window_and_filled(
            cells in prop::collection::vec(prop::bool::ANY, 0..80),
            start in 1u32..40,
            span in 0u32..60,
        ) {
            let max = start + span;
            let col: Vec<String> = cells.iter().map(|&f| if f { "v".into() } else { String::new() }).collect();
            let last = last_row_backward(&col, start, max);

            prop_assert!(last >= start && last <= max.max(start));
            let filled_in_window = (start..=max).any(|r| cells.get((r - 1) as usize) == Some(&true));
            if filled_in_window {
                prop_assert_eq!(cells.get((last - 1) as usize), Some(&true));
                prop_assert!((last + 1..=max).all(|r| cells.get((r - 1) as usize) != Some(&true)));
            } else {
                prop_assert_eq!(last, start);
            }
        }
    }
}
