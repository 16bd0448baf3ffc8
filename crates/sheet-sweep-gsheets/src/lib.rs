//! Google Sheets provider for sheet-sweep.
//!
//! Implements [`SpreadsheetProvider`](sheet_sweep::SpreadsheetProvider) on top of
//! the Sheets v4 REST API. Cell values go through `values:batchGet` and
//! `values:batchUpdate`, validation rules come from the spreadsheet metadata
//! and PDF exports are downloaded from the export endpoint.
//!
//! # Architecture
//!
//! ```text
//! BatchRunner (sheet-sweep)
//!     └── Spreadsheet (this crate)
//!           └── GoogleSheets: reqwest client + bearer tokens
//!                 └── HTTPS to sheets.googleapis.com / docs.google.com
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use sheet_sweep::list_visible_worksheets;
//! use sheet_sweep_gsheets::{GoogleSheets, GoogleSheetsConfig};
//!
//! # async fn example() -> sheet_sweep::Result<()> {
//! let config = GoogleSheetsConfig {
//!     credentials_path: Some("credentials.json".into()),
//!     ..Default::default()
//! };
//! let client = GoogleSheets::connect(config).await?;
//! let book = client
//!     .open_by_url("https://docs.google.com/spreadsheets/d/1AbCdEfGhIjKlMnOpQrStUv/edit")
//!     .await?;
//!
//! for title in list_visible_worksheets(&book).await? {
//!     println!("{}", title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::TokenSource;
pub use client::{spreadsheet_key, GoogleSheets, Spreadsheet};
pub use config::GoogleSheetsConfig;
pub use error::ApiError;
