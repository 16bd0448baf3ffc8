//! Change detection on a sentinel range
//!
//! After the driving cell is written the sheet recalculates asynchronously.
//! The poller watches a small sentinel range and reports as soon as its values
//! differ from a snapshot taken before the write.

use crate::error::Result;
use crate::provider::{SpreadsheetProvider, Worksheet};
use sheet_sweep_core::{RangeReference, Snapshot};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Delay between two sentinel reads
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Read the sentinel range as a baseline
pub async fn capture_snapshot<P: SpreadsheetProvider>(
    provider: &P,
    ws: &Worksheet,
    sentinel: &RangeReference,
) -> Result<Snapshot> {
    Ok(Snapshot::new(provider.read_range(ws, sentinel).await?))
}

/// Wait until `sentinel` differs from `baseline`, polling every [`POLL_INTERVAL`].
///
/// Returns `false` once `timeout` has elapsed without a change. Read errors
/// are logged and count as "no change yet".
pub async fn wait_for_change<P: SpreadsheetProvider>(
    provider: &P,
    ws: &Worksheet,
    sentinel: &RangeReference,
    baseline: &Snapshot,
    timeout: Duration,
) -> bool {
    wait_for_change_every(provider, ws, sentinel, baseline, timeout, POLL_INTERVAL).await
}

/// [`wait_for_change`] with an explicit polling interval
pub async fn wait_for_change_every<P: SpreadsheetProvider>(
    provider: &P,
    ws: &Worksheet,
    sentinel: &RangeReference,
    baseline: &Snapshot,
    timeout: Duration,
    interval: Duration,
) -> bool {
    let start = Instant::now();

    while start.elapsed() < timeout {
        match provider.read_range(ws, sentinel).await {
            Ok(grid) => {
                if Snapshot::new(grid) != *baseline {
                    tracing::debug!(
                        "Sentinel {} changed after {:.1}s",
                        sentinel.body(),
                        start.elapsed().as_secs_f64()
                    );
                    return true;
                }
            }
            Err(e) => tracing::warn!("Error reading sentinel {}: {}", sentinel.body(), e),
        }
        sleep(interval).await;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWorkbook;
    use sheet_sweep_core::CellAddress;

    fn sentinel() -> RangeReference {
        RangeReference::parse("B9:B17").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_detects_change_after_latency() {
        let book = MemoryWorkbook::new();
        let ws = book.add_sheet("Report");
        book.set_value("Report", "B9", "old").unwrap();
        book.on_change("Report", "B6", Duration::from_millis(1200), |_, sheet| {
            sheet.set(CellAddress::new(2, 9).unwrap(), "new");
        })
        .unwrap();

        let baseline = capture_snapshot(&book, &ws, &sentinel()).await.unwrap();
        book.write_cell(&ws, CellAddress::new(2, 6).unwrap(), "Wing").await.unwrap();

        let start = Instant::now();
        let changed =
            wait_for_change(&book, &ws, &sentinel(), &baseline, Duration::from_secs(10)).await;
        assert!(changed);
        assert!(start.elapsed() >= Duration::from_millis(1200));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_no_earlier_than_timeout() {
        let book = MemoryWorkbook::new();
        let ws = book.add_sheet("Report");
        book.set_value("Report", "B9", "steady").unwrap();
        let baseline = capture_snapshot(&book, &ws, &sentinel()).await.unwrap();

        let start = Instant::now();
        let changed =
            wait_for_change(&book, &ws, &sentinel(), &baseline, Duration::from_secs(3)).await;
        assert!(!changed);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_errors_count_as_no_change() {
        let book = MemoryWorkbook::new();
        let ws = book.add_sheet("Report");
        let baseline = capture_snapshot(&book, &ws, &sentinel()).await.unwrap();

        book.fail_reads("Report", "B9:B17", 2).unwrap();
        book.script_reads("Report", "B9:B17", vec![vec![vec!["filled".into()]]])
            .unwrap();

        let start = Instant::now();
        let changed =
            wait_for_change(&book, &ws, &sentinel(), &baseline, Duration::from_secs(5)).await;
        assert!(changed);
        assert!(start.elapsed() >= POLL_INTERVAL * 2);
        assert!(start.elapsed() < POLL_INTERVAL * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_change_still_counts() {
        let book = MemoryWorkbook::new();
        let ws = book.add_sheet("Report");
        book.set_value("Report", "B9", "old").unwrap();
        let baseline = capture_snapshot(&book, &ws, &sentinel()).await.unwrap();

        let old = || vec![vec!["old".to_string()]];
        book.script_reads(
            "Report",
            "B9:B17",
            vec![old(), vec![vec!["new".to_string()]], old(), old()],
        )
        .unwrap();

        let start = Instant::now();
        let changed =
            wait_for_change(&book, &ws, &sentinel(), &baseline, Duration::from_secs(10)).await;
        assert!(changed);
        assert!(start.elapsed() >= POLL_INTERVAL);
        assert!(start.elapsed() < POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_never_reads() {
        let book = MemoryWorkbook::new();
        let ws = book.add_sheet("Report");
        book.script_reads("Report", "B9:B17", vec![vec![vec!["x".into()]]])
            .unwrap();
        let changed =
            wait_for_change(&book, &ws, &sentinel(), &Snapshot::default(), Duration::ZERO).await;
        assert!(!changed);
    }
}
