//! sheet-sweep CLI - export one report per dropdown value

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use sheet_sweep::prelude::*;
use sheet_sweep::{find_rule_for_cell, find_validation_rules};
use sheet_sweep_gsheets::{GoogleSheets, GoogleSheetsConfig, Spreadsheet};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sweep")]
#[command(
    author,
    version,
    about = "Walk a spreadsheet dropdown and export the report block for every value"
)]
struct Cli {
    /// Spreadsheet URL (or key)
    #[arg(long, global = true, env = "SHEET_SWEEP_URL")]
    url: Option<String>,

    /// Service account key file
    #[arg(long, global = true, env = "SHEET_SWEEP_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Pre-issued OAuth access token (overrides --credentials)
    #[arg(long, global = true, env = "SHEET_SWEEP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the worksheets of the spreadsheet
    Sheets,

    /// Show the values offered by the driving dropdown
    #[command(alias = "values")]
    Dropdown {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Export a report for every dropdown value
    Run {
        #[command(flatten)]
        job: JobArgs,

        /// Write the run summary as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },
}

impl Commands {
    /// Validated job for the commands that need one
    fn job(&self) -> Result<Option<JobConfig>> {
        match self {
            Commands::Sheets => Ok(None),
            Commands::Dropdown { job } | Commands::Run { job, .. } => job.job().map(Some),
        }
    }
}

/// Job file plus per-field overrides
#[derive(clap::Args, Debug, Default)]
struct JobArgs {
    /// Job settings (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worksheet holding the dropdown
    #[arg(long)]
    sheet: Option<String>,

    /// Dropdown cell, e.g. B6
    #[arg(long)]
    cell: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Export format: pdf, xlsx or csv
    #[arg(short, long)]
    format: Option<String>,

    /// File naming: dropdown, sequential or timestamp
    #[arg(long)]
    naming: Option<String>,

    /// Seconds to wait for recalculation
    #[arg(long)]
    timeout: Option<u64>,

    /// Lowest row scanned for data
    #[arg(long)]
    max_row: Option<u32>,

    /// Row closing open-ended dropdown source ranges
    #[arg(long)]
    row_ceiling: Option<u32>,
}

impl JobArgs {
    /// Settings from the job file (or defaults) with flags applied on top
    fn settings(&self) -> Result<JobSettings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => JobSettings::default(),
        };

        if let Some(sheet) = &self.sheet {
            settings.sheet = sheet.clone();
        }
        if let Some(cell) = &self.cell {
            settings.driving_cell = cell.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(format) = &self.format {
            settings.format = format.clone();
        }
        if let Some(naming) = &self.naming {
            settings.naming = naming.clone();
        }
        if let Some(secs) = self.timeout {
            settings.timeout_secs = secs;
        }
        if let Some(row) = self.max_row {
            settings.max_row = row;
        }
        if let Some(ceiling) = self.row_ceiling {
            settings.row_ceiling = ceiling;
        }
        Ok(settings)
    }

    fn job(&self) -> Result<JobConfig> {
        self.settings()?
            .parse()
            .context("Invalid job settings")
    }
}

fn load_settings(path: &Path) -> Result<JobSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse '{}'", path.display()))
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(url) = cli.url.as_deref() else {
        bail!("No spreadsheet given (use --url or SHEET_SWEEP_URL)");
    };
    let job = cli.command.job()?;

    let client = GoogleSheets::connect(GoogleSheetsConfig {
        credentials_path: cli.credentials.clone(),
        access_token: cli.token.clone(),
        ..Default::default()
    })
    .await
    .context("Failed to connect to Google Sheets")?;
    let book = client
        .open_by_url(url)
        .await
        .with_context(|| format!("Failed to open '{}'", url))?;

    match (&cli.command, job) {
        (Commands::Dropdown { .. }, Some(job)) => show_dropdown(&book, &job).await,
        (Commands::Run { summary_json, .. }, Some(job)) => {
            run_job(&book, &job, summary_json.as_deref()).await
        }
        _ => list_sheets(&book).await,
    }
}

async fn list_sheets(book: &Spreadsheet<'_>) -> Result<()> {
    let sheets = book
        .list_worksheets()
        .await
        .context("Failed to list worksheets")?;

    println!("Worksheets: {}", sheets.len());
    for (i, ws) in sheets.iter().enumerate() {
        let marker = if ws.hidden { " (hidden)" } else { "" };
        println!("  [{}] {}{}", i, ws.title, marker);
    }
    Ok(())
}

async fn show_dropdown(book: &Spreadsheet<'_>, job: &JobConfig) -> Result<()> {
    let ws = book
        .worksheet(&job.sheet)
        .await
        .with_context(|| format!("Worksheet '{}' not found", job.sheet))?;

    if let Some(cell) = job.label_cell {
        match book.read_cell(&ws, cell).await? {
            Some(label) => println!("Label ({}): {}", cell, label),
            None => tracing::warn!("Label cell {} is empty", cell),
        }
    }

    let rules = find_validation_rules(book, &ws, job.row_ceiling).await?;
    if let Some(rule) = find_rule_for_cell(&rules, job.driving_cell) {
        println!(
            "Source: {}",
            rule.source.as_deref().unwrap_or("(inline list)")
        );
    }

    let values = load_dropdown_values(book, &ws, job.driving_cell, job.row_ceiling).await?;
    if values.is_empty() {
        bail!("No dropdown values found at {}", job.driving_cell);
    }

    println!("Values: {}", values.len());
    for (i, value) in values.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, value);
    }
    Ok(())
}

async fn run_job(book: &Spreadsheet<'_>, job: &JobConfig, summary_json: Option<&Path>) -> Result<()> {
    let ws = book
        .worksheet(&job.sheet)
        .await
        .with_context(|| format!("Worksheet '{}' not found", job.sheet))?;

    let values = load_dropdown_values(book, &ws, job.driving_cell, job.row_ceiling).await?;
    if values.is_empty() {
        bail!("No dropdown values found at {}", job.driving_cell);
    }
    tracing::info!("Loaded {} dropdown values", values.len());

    let mut runner = BatchRunner::new(book, job);
    let cancel = runner.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Stop requested, finishing the current value");
            cancel.cancel();
        }
    });

    match runner.run(&values).await {
        Ok(summary) => {
            print_summary(&summary);
            write_summary(&summary, summary_json)
        }
        Err(e) => {
            if let Some(summary) = e.partial_summary() {
                print_summary(summary);
                write_summary(summary, summary_json)?;
            }
            Err(e).context("Run aborted")
        }
    }
}

fn write_summary(summary: &RunSummary, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let json = serde_json::to_string_pretty(summary).context("Failed to encode summary")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write '{}'", path.display()))?;
    eprintln!("Wrote summary to '{}'", path.display());
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Run {:?}", summary.state);
    println!("  Successful: {}", summary.success_count);
    println!("  Failed:     {}", summary.failure_count);
    if !summary.restored {
        println!("  Warning: the dropdown cell could not be restored");
    }

    if summary.failure_count > 0 {
        println!();
        println!("Failed values (check these manually):");
        for failure in summary.failures() {
            println!(
                "  - {}: {}",
                failure.value,
                failure.reason.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
