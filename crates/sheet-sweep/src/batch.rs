//! Batch orchestration
//!
//! A run walks the dropdown values strictly one at a time. For each value it
//! snapshots the sentinel range, writes the value into the driving cell,
//! waits for the sheet to recalculate, measures the data block and exports
//! it. Per-value errors are recorded and the run moves on; the driving cell
//! is put back to its original value at the end, however the run ends.

use crate::error::{Result, SweepError};
use crate::job::JobConfig;
use crate::naming;
use crate::poller::{capture_snapshot, wait_for_change};
use crate::provider::{SpreadsheetProvider, Worksheet};
use crate::scanner::find_last_row_backward;
use chrono::Local;
use serde::Serialize;
use sheet_sweep_core::{DropdownValues, Error as CoreError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reason recorded when the driving cell cannot be written
pub const WRITE_FAILURE_REASON: &str = "could not set dropdown value";

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Stopped,
    Completed,
}

/// Outcome of one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// What happened to one dropdown value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    pub value: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl ProcessingResult {
    fn success(value: &str, file: PathBuf) -> Self {
        Self {
            value: value.to_string(),
            outcome: Outcome::Success,
            reason: None,
            file: Some(file),
        }
    }

    fn failure(value: &str, reason: String) -> Self {
        Self {
            value: value.to_string(),
            outcome: Outcome::Failure,
            reason: Some(reason),
            file: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Report of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub state: RunState,
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<ProcessingResult>,
    /// Whether the driving cell was written back successfully
    pub restored: bool,
}

impl RunSummary {
    /// Failed values, in processing order
    pub fn failures(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Shared flag asking a run to stop before its next value
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs a job over a set of dropdown values
pub struct BatchRunner<'a, P> {
    provider: &'a P,
    job: &'a JobConfig,
    cancel: CancelFlag,
    state: RunState,
}

impl<'a, P: SpreadsheetProvider> BatchRunner<'a, P> {
    pub fn new(provider: &'a P, job: &'a JobConfig) -> Self {
        Self {
            provider,
            job,
            cancel: CancelFlag::new(),
            state: RunState::Idle,
        }
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle for stopping this runner
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Process every value and restore the driving cell.
    ///
    /// Fails before doing anything when `values` is empty or the worksheet or
    /// driving cell cannot be read. A connection loss during the run stops it,
    /// restores the driving cell, and is returned as [`SweepError::Aborted`]
    /// carrying the results gathered so far.
    pub async fn run(&mut self, values: &DropdownValues) -> Result<RunSummary> {
        if values.is_empty() {
            return Err(SweepError::InvalidInput(CoreError::invalid_input(
                "no dropdown values to process",
            )));
        }

        let job = self.job;
        tokio::fs::create_dir_all(&job.output_dir).await?;

        let ws = self.provider.worksheet(&job.sheet).await?;

        if let Some(cell) = job.label_cell {
            match self.provider.read_cell(&ws, cell).await {
                Ok(Some(label)) => tracing::info!("Menu ({}): {}", cell, label),
                Ok(None) => tracing::warn!("Label cell {} is empty", cell),
                Err(e) => tracing::warn!("Could not read label cell {}: {}", cell, e),
            }
        }

        let original = match self.provider.read_cell(&ws, job.driving_cell).await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                return Err(SweepError::Critical(format!(
                    "could not read original value of {}: {}",
                    job.driving_cell,
                    e.reason()
                )))
            }
        };
        tracing::debug!("Original value of {}: '{}'", job.driving_cell, original);

        self.state = RunState::Running;
        let total = values.len();
        let mut results: Vec<ProcessingResult> = Vec::with_capacity(total);
        let mut aborted: Option<SweepError> = None;
        let mut taken: HashMap<PathBuf, String> = HashMap::new();

        tracing::info!("Processing {} dropdown values", total);
        for (i, value) in values.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!("Automation stopped by user");
                self.state = RunState::Stopped;
                break;
            }

            tracing::info!("[{}/{}] Processing: '{}'", i + 1, total, value);
            let path = self.output_path(value, i + 1, &mut taken);
            match self.process_value(&ws, value, &path).await {
                Ok(file) => {
                    tracing::info!("  Saved: {}", file.display());
                    results.push(ProcessingResult::success(value, file));
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!("  Run aborted while processing '{}': {}", value, e);
                    results.push(ProcessingResult::failure(value, e.reason()));
                    aborted = Some(e);
                    self.state = RunState::Stopped;
                    break;
                }
                Err(e) => {
                    tracing::warn!("  Error: {}", e);
                    results.push(ProcessingResult::failure(value, e.reason()));
                }
            }
        }
        if self.state == RunState::Running {
            self.state = RunState::Completed;
        }

        let restored = self.restore(&ws, &original).await;

        let success_count = results.iter().filter(|r| r.is_success()).count();
        let summary = RunSummary {
            state: self.state,
            success_count,
            failure_count: results.len() - success_count,
            results,
            restored,
        };

        if let Some(source) = aborted {
            return Err(SweepError::Aborted {
                summary: Box::new(summary),
                source: Box::new(source),
            });
        }

        tracing::info!(
            "COMPLETE! Success: {}, Failed: {}",
            summary.success_count,
            summary.failure_count
        );
        Ok(summary)
    }

    /// Destination for the `index`-th value, unique within the run.
    ///
    /// Distinct values can sanitise to the same name; later ones get
    /// `_<index>` appended rather than overwriting an earlier report.
    fn output_path(&self, value: &str, index: usize, taken: &mut HashMap<PathBuf, String>) -> PathBuf {
        let job = self.job;
        let mut name = naming::file_name(job.naming, value, index, job.format, &Local::now());
        let mut path = job.output_dir.join(&name);
        if let Some(earlier) = taken.get(&path) {
            tracing::warn!("  File name {} is already used by '{}'", name, earlier);
            while taken.contains_key(&path) {
                name = naming::with_suffix(&name, index);
                path = job.output_dir.join(&name);
            }
            tracing::warn!("  Saving '{}' as {} instead", value, name);
        }
        taken.insert(path.clone(), value.to_string());
        path
    }

    async fn process_value(&self, ws: &Worksheet, value: &str, path: &Path) -> Result<PathBuf> {
        let job = self.job;
        let baseline = capture_snapshot(self.provider, ws, &job.sentinel).await?;

        tracing::info!("  Setting {} to: {}", job.driving_cell, value);
        self.provider
            .write_cell(ws, job.driving_cell, value)
            .await
            .map_err(|e| {
                if e.is_fatal() {
                    return e;
                }
                tracing::warn!("  Write of '{}' failed: {}", value, e);
                SweepError::Write(WRITE_FAILURE_REASON.to_string())
            })?;

        tracing::info!("  Waiting for sheet update (monitoring {})...", job.sentinel.body());
        if wait_for_change(self.provider, ws, &job.sentinel, &baseline, job.timeout).await {
            tracing::info!("  Sheet updated");
        } else {
            tracing::warn!(
                "  No change detected after {}s, proceeding anyway",
                job.timeout.as_secs()
            );
        }

        let last_row = find_last_row_backward(
            self.provider,
            ws,
            job.check_column,
            job.data_start.row,
            job.max_row,
        )
        .await?;
        let range = job.export_range(last_row);
        tracing::info!("  Data range: {}", range.body());

        self.provider
            .export_range(ws, &range, job.format, path)
            .await?;
        Ok(path.to_path_buf())
    }

    async fn restore(&self, ws: &Worksheet, original: &str) -> bool {
        let cell = self.job.driving_cell;
        match self.provider.write_cell(ws, cell, original).await {
            Ok(()) => {
                tracing::info!("Restored {} to '{}'", cell, original);
                true
            }
            Err(e) => {
                tracing::warn!("Could not restore {} to '{}': {}", cell, original, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobSettings;
    use crate::memory::MemoryWorkbook;

    fn job(dir: &std::path::Path) -> JobConfig {
        JobSettings {
            sheet: "Report".into(),
            output_dir: dir.to_path_buf(),
            format: "csv".into(),
            naming: "sequential".into(),
            timeout_secs: 1,
            ..JobSettings::default()
        }
        .parse()
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let book = MemoryWorkbook::new();
        book.add_sheet("Report");
        let job = job(dir.path());

        let mut runner = BatchRunner::new(&book, &job);
        let err = runner.run(&DropdownValues::default()).await.unwrap_err();
        assert!(matches!(err, SweepError::InvalidInput(_)));
        assert_eq!(runner.state(), RunState::Idle);
        assert!(book.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start_still_restores() {
        let dir = tempfile::tempdir().unwrap();
        let book = MemoryWorkbook::new();
        book.add_sheet("Report");
        book.set_value("Report", "B6", "Original").unwrap();
        let job = job(dir.path());

        let mut runner = BatchRunner::new(&book, &job);
        runner.cancel_flag().cancel();
        let summary = runner
            .run(&DropdownValues::collect(["Alpha", "Beta"]))
            .await
            .unwrap();

        assert_eq!(summary.state, RunState::Stopped);
        assert!(summary.results.is_empty());
        assert!(summary.restored);
        assert_eq!(book.value("Report", "B6").as_deref(), Some("Original"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_sheet_fails_before_run() {
        let dir = tempfile::tempdir().unwrap();
        let book = MemoryWorkbook::new();
        let job = job(dir.path());

        let err = BatchRunner::new(&book, &job)
            .run(&DropdownValues::collect(["Alpha"]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
