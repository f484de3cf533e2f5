//! Google Sheets target (REST v4) authorised by an OAuth access token.

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client as HttpClient, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ReportSink;
use crate::config::VersionCheck;
use crate::error::{ReportError, Result};
use crate::report::Row;

pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const USER_ENTERED: &str = "USER_ENTERED";
/// Header row plus one data row, so the header style is not propagated.
const ROWS_KEPT_ON_CLEAR: u32 = 2;

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsSink {
    http: HttpClient,
    api_base: String,
    spreadsheet_id: String,
    sheet_ids: HashMap<String, i64>,
    version_check: Option<(String, VersionCheck)>,
}

impl SheetsSink {
    pub fn new(spreadsheet_id: impl Into<String>, access_token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|err| ReportError::Config(format!("invalid access token: {}", err)))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let http = HttpClient::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            api_base: DEFAULT_SHEETS_API.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_ids: HashMap::new(),
            version_check: None,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Checks `check.cell` on `tab` during preflight.
    pub fn with_version_check(mut self, tab: impl Into<String>, check: VersionCheck) -> Self {
        self.version_check = Some((tab.into(), check));
        self
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|err| ReportError::Config(format!("invalid sheets api url: {}", err)))?;
        url.path_segments_mut()
            .map_err(|_| ReportError::Config("sheets api url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = self.url(&[self.spreadsheet_id.as_str(), "values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", USER_ENTERED);
        Ok(url)
    }

    async fn sheet_id(&mut self, tab: &str) -> Result<i64> {
        if self.sheet_ids.is_empty() {
            let mut url = self.url(&[self.spreadsheet_id.as_str()])?;
            url.query_pairs_mut()
                .append_pair("fields", "sheets.properties(sheetId,title)");
            let meta: SpreadsheetMeta = parse_json(self.http.get(url).send().await?).await?;
            self.sheet_ids = meta
                .sheets
                .into_iter()
                .map(|entry| (entry.properties.title, entry.properties.sheet_id))
                .collect();
        }
        self.sheet_ids
            .get(tab)
            .copied()
            .ok_or_else(|| ReportError::Publish(format!("spreadsheet has no tab named {:?}", tab)))
    }

    async fn read_cell(&self, tab: &str, cell: &str) -> Result<String> {
        let range = a1_range(tab, cell);
        let url = self.url(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        let value_range: ValueRange = parse_json(self.http.get(url).send().await?).await?;
        Ok(value_range
            .values
            .first()
            .and_then(|row| row.first())
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default())
    }

    async fn put_values(&self, range: &str, values: Value) -> Result<()> {
        let url = self.values_url(range)?;
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });
        let _: Value = parse_json(self.http.put(url).json(&body).send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl ReportSink for SheetsSink {
    async fn preflight(&mut self) -> Result<()> {
        let Some((tab, check)) = self.version_check.clone() else {
            return Ok(());
        };
        let required = self.read_cell(&tab, &check.cell).await?;
        if required.trim() != check.version.trim() {
            error!(
                "report version {:?} not valid, the spreadsheet requires {:?}",
                check.version, required
            );
            return Err(ReportError::VersionMismatch {
                version: check.version,
                required,
            });
        }
        Ok(())
    }

    async fn replace_rows(&mut self, tab: &str, rows: &[Row]) -> Result<()> {
        let sheet_id = self.sheet_id(tab).await?;
        let batch = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url(&[batch.as_str()])?;
        let resize = json!({
            "requests": [{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": sheet_id,
                        "gridProperties": { "rowCount": ROWS_KEPT_ON_CLEAR }
                    },
                    "fields": "gridProperties.rowCount"
                }
            }]
        });
        let _: Value = parse_json(self.http.post(url).json(&resize).send().await?).await?;
        debug!("{} cleared", tab);

        let values = if rows.is_empty() {
            json!([[""]])
        } else {
            serde_json::to_value(rows).map_err(|err| ReportError::Publish(err.to_string()))?
        };
        self.put_values(&a1_range(tab, "A2"), values).await
    }

    async fn write_cell(&mut self, tab: &str, cell: &str, value: &str) -> Result<()> {
        self.put_values(&a1_range(tab, cell), json!([[value]])).await
    }
}

/// `'Tab'!A2`, with quotes in the tab name doubled.
fn a1_range(tab: &str, cell: &str) -> String {
    format!("'{}'!{}", tab.replace('\'', "''"), cell)
}

async fn parse_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        response.json::<T>().await.map_err(ReportError::from)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ReportError::Publish(format!("sheets api {}: {}", status, body)))
    }
}
