//! HTTP client and spreadsheet handle.

use std::path::Path;

use lazy_regex::regex;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use sheet_sweep::{write_grid_file, CellValidation, SpreadsheetProvider, SweepError, Worksheet};
use sheet_sweep_core::{index_to_column, CellAddress, Grid, RangeBound, RangeReference};
use sheet_sweep_export::ExportFormat;

use crate::api::{self, BatchGetResponse, BatchUpdateRequest, SpreadsheetMeta, ValueRange};
use crate::auth::TokenSource;
use crate::config::GoogleSheetsConfig;
use crate::error::{ApiError, Result};

/// An authenticated connection to the Sheets API.
pub struct GoogleSheets {
    http: Client,
    tokens: TokenSource,
    config: GoogleSheetsConfig,
}

impl GoogleSheets {
    /// Authenticate with the configured credentials.
    ///
    /// A static access token wins over a credentials file. A token is fetched
    /// once up front so bad credentials fail here rather than mid-run.
    pub async fn connect(config: GoogleSheetsConfig) -> std::result::Result<Self, SweepError> {
        let tokens = match (&config.access_token, &config.credentials_path) {
            (Some(token), _) => TokenSource::Static(token.clone()),
            (None, Some(path)) => TokenSource::service_account(path)
                .await
                .map_err(|e| SweepError::Connection(e.to_string()))?,
            (None, None) => {
                return Err(SweepError::Connection(
                    "no credentials configured (service account key or access token)".into(),
                ))
            }
        };
        tokens
            .token()
            .await
            .map_err(|e| SweepError::Connection(e.to_string()))?;

        let http = Client::builder()
            .user_agent(concat!("sheet-sweep/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SweepError::Connection(format!("could not create HTTP client: {}", e)))?;

        tracing::info!("Connected to Google Sheets API at {}", config.api_base);
        Ok(Self {
            http,
            tokens,
            config,
        })
    }

    /// Open a spreadsheet from its browser URL (or bare key).
    pub async fn open_by_url(&self, url: &str) -> std::result::Result<Spreadsheet<'_>, SweepError> {
        let key = spreadsheet_key(url).map_err(|e| e.into_sweep(SweepError::Connection))?;
        self.open_by_key(&key).await
    }

    /// Open a spreadsheet by key, checking that it is reachable.
    pub async fn open_by_key(&self, key: &str) -> std::result::Result<Spreadsheet<'_>, SweepError> {
        let sheet = Spreadsheet {
            client: self,
            id: key.to_string(),
        };
        let sheets = sheet.fetch_worksheets().await.map_err(|e| match e {
            ApiError::Http { status: 404, .. } => {
                SweepError::Connection(format!("spreadsheet {} not found or not shared", key))
            }
            other => SweepError::Connection(other.to_string()),
        })?;
        tracing::info!("Opened spreadsheet {} ({} worksheets)", key, sheets.len());
        Ok(sheet)
    }

    pub fn config(&self) -> &GoogleSheetsConfig {
        &self.config
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.tokens.token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorized(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Spreadsheet key from a URL such as
/// `https://docs.google.com/spreadsheets/d/<key>/edit#gid=0`, or the key itself.
pub fn spreadsheet_key(url: &str) -> Result<String> {
    let url = url.trim();
    if let Some(caps) = regex!(r"/spreadsheets/d/([A-Za-z0-9_-]+)").captures(url) {
        return Ok(caps[1].to_string());
    }
    if regex!(r"^[A-Za-z0-9_-]{20,}$").is_match(url) {
        return Ok(url.to_string());
    }
    Err(ApiError::InvalidUrl(url.to_string()))
}

/// An open spreadsheet.
pub struct Spreadsheet<'a> {
    client: &'a GoogleSheets,
    id: String,
}

impl<'a> Spreadsheet<'a> {
    /// The spreadsheet key
    pub fn id(&self) -> &str {
        &self.id
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/spreadsheets/{}{}",
            self.client.config.api_base.trim_end_matches('/'),
            self.id,
            suffix
        )
    }

    async fn fetch_worksheets(&self) -> Result<Vec<Worksheet>> {
        let request = self
            .client
            .http
            .get(self.url(""))
            .query(&[("fields", "sheets.properties(sheetId,title,hidden)")]);
        let meta: SpreadsheetMeta = self.client.get_json(request).await?;
        Ok(meta
            .sheets
            .iter()
            .map(|s| Worksheet::from(&s.properties))
            .collect())
    }

    async fn batch_get(&self, range: &str, major_dimension: &str) -> Result<Vec<Vec<serde_json::Value>>> {
        let request = self.client.http.get(self.url("/values:batchGet")).query(&[
            ("ranges", range),
            ("majorDimension", major_dimension),
            ("valueRenderOption", "FORMATTED_VALUE"),
        ]);
        let response: BatchGetResponse = self.client.get_json(request).await?;
        Ok(response
            .value_ranges
            .into_iter()
            .next()
            .map(|vr| vr.values)
            .unwrap_or_default())
    }

    async fn download(&self, url: &str, query: &[(&str, String)], dest: &Path) -> Result<()> {
        let request = self.client.http.get(url).query(query);
        let response = self.client.authorized(request).await?;
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }
}

impl SpreadsheetProvider for Spreadsheet<'_> {
    async fn list_worksheets(&self) -> sheet_sweep::Result<Vec<Worksheet>> {
        self.fetch_worksheets()
            .await
            .map_err(|e| e.into_sweep(SweepError::Read))
    }

    async fn read_range(&self, ws: &Worksheet, range: &RangeReference) -> sheet_sweep::Result<Grid> {
        let qualified = range.qualified(&ws.title);
        tracing::trace!("Reading {}", qualified);
        let values = self
            .batch_get(&qualified, "ROWS")
            .await
            .map_err(|e| e.into_sweep(SweepError::Read))?;
        Ok(api::values_to_grid(values))
    }

    async fn write_cell(&self, ws: &Worksheet, cell: CellAddress, value: &str) -> sheet_sweep::Result<()> {
        let range = RangeReference {
            sheet: None,
            start: RangeBound::cell(cell),
            end: None,
        };
        let body = BatchUpdateRequest {
            value_input_option: "USER_ENTERED",
            data: vec![ValueRange {
                range: Some(range.qualified(&ws.title)),
                values: vec![vec![serde_json::Value::String(value.to_string())]],
            }],
        };
        let request = self
            .client
            .http
            .post(self.url("/values:batchUpdate"))
            .json(&body);
        self.client
            .authorized(request)
            .await
            .map_err(|e| e.into_sweep(SweepError::Write))?;

        let delay = self.client.config.settle_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn read_column(&self, ws: &Worksheet, col: u32) -> sheet_sweep::Result<Vec<String>> {
        let letters = index_to_column(col)?;
        let range = format!("{}!{}:{}", sheet_sweep_core::quote_sheet_name(&ws.title), letters, letters);
        let values = self
            .batch_get(&range, "COLUMNS")
            .await
            .map_err(|e| e.into_sweep(SweepError::Read))?;
        Ok(api::values_to_grid(values).into_iter().next().unwrap_or_default())
    }

    async fn read_all(&self, ws: &Worksheet) -> sheet_sweep::Result<Grid> {
        let range = sheet_sweep_core::quote_sheet_name(&ws.title);
        let values = self
            .batch_get(&range, "ROWS")
            .await
            .map_err(|e| e.into_sweep(SweepError::Read))?;
        Ok(api::values_to_grid(values))
    }

    async fn validation_metadata(&self, ws: &Worksheet) -> sheet_sweep::Result<Vec<CellValidation>> {
        let range = sheet_sweep_core::quote_sheet_name(&ws.title);
        let request = self.client.http.get(self.url("")).query(&[
            ("ranges", range.as_str()),
            (
                "fields",
                "sheets(properties(sheetId,title),data(startRow,startColumn,rowData.values.dataValidation))",
            ),
        ]);
        let meta: SpreadsheetMeta = self
            .client
            .get_json(request)
            .await
            .map_err(|e| e.into_sweep(SweepError::Read))?;

        let found: Vec<CellValidation> = meta
            .sheets
            .iter()
            .filter(|s| s.properties.sheet_id == ws.id)
            .flat_map(api::collect_validations)
            .collect();
        tracing::debug!("{} cells with validation on '{}'", found.len(), ws.title);
        Ok(found)
    }

    async fn export_range(
        &self,
        ws: &Worksheet,
        range: &RangeReference,
        format: ExportFormat,
        dest: &Path,
    ) -> sheet_sweep::Result<()> {
        if format.is_local() {
            let grid = self.read_range(ws, range).await?;
            return write_grid_file(format, grid, dest).await;
        }

        let url = format!(
            "{}/spreadsheets/d/{}/export",
            self.client.config.export_base.trim_end_matches('/'),
            self.id
        );
        let query = [
            ("format", format.extension().to_string()),
            ("gid", ws.id.to_string()),
            ("range", range.body()),
        ];
        self.download(&url, &query, dest)
            .await
            .map_err(|e| e.into_sweep(SweepError::Export))
    }
}
