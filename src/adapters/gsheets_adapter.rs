//! Google Sheets publisher over the Sheets REST v4 API.
//!
//! Authenticates with a bearer access token. Writing a worksheet deletes any
//! existing worksheet with the same title, adds a fresh one sized to the
//! table, then uploads header and rows in a single values update.

use crate::domain::error::AlgoError;
use crate::domain::table::{Cell, Table};
use crate::ports::sheet_port::SheetPort;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

const BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

pub struct GoogleSheetsAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

impl GoogleSheetsAdapter {
    pub fn new(spreadsheet_id: &str, access_token: &str) -> Result<Self, AlgoError> {
        Self::with_base_url(BASE_URL, spreadsheet_id, access_token)
    }

    pub fn with_base_url(
        base_url: &str,
        spreadsheet_id: &str,
        access_token: &str,
    ) -> Result<Self, AlgoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn url(&self, worksheet: &str, segments: &[&str]) -> Result<Url, AlgoError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| publish_error(worksheet, e))?;
        url.path_segments_mut()
            .map_err(|_| publish_error(worksheet, "base url cannot carry a path"))?
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    fn check(
        worksheet: &str,
        resp: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, AlgoError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(publish_error(worksheet, format!("HTTP {status}: {body}")))
    }

    fn existing_sheet_id(&self, worksheet: &str) -> Result<Option<i64>, AlgoError> {
        let mut url = self.url(worksheet, &[self.spreadsheet_id.as_str()])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?;
        let meta: SpreadsheetMeta = Self::check(worksheet, resp)?
            .json()
            .map_err(|e| publish_error(worksheet, format!("bad metadata response: {e}")))?;
        Ok(find_sheet_id(&meta, worksheet))
    }
}

fn publish_error(worksheet: &str, reason: impl ToString) -> AlgoError {
    AlgoError::Publish {
        worksheet: worksheet.to_string(),
        reason: reason.to_string(),
    }
}

fn find_sheet_id(meta: &SpreadsheetMeta, title: &str) -> Option<i64> {
    meta.sheets
        .iter()
        .find(|s| s.properties.title == title)
        .map(|s| s.properties.sheet_id)
}

/// batchUpdate body that drops `existing` (if any) and adds a sheet sized
/// one row and one column larger than the table.
fn replace_requests(existing: Option<i64>, title: &str, table: &Table) -> Value {
    let mut requests: Vec<Value> = existing
        .map(|id| json!({ "deleteSheet": { "sheetId": id } }))
        .into_iter()
        .collect();
    requests.push(json!({
        "addSheet": {
            "properties": {
                "title": title,
                "gridProperties": {
                    "rowCount": table.len() + 1,
                    "columnCount": table.columns.len() + 1,
                }
            }
        }
    }));
    json!({ "requests": requests })
}

/// Numbers go out as JSON numbers so the sheet stores them as values, not text.
fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Number(v) if v.is_finite() => Value::from(*v),
        Cell::Integer(v) => Value::from(*v),
        other => Value::from(other.render()),
    }
}

fn values_body(range: &str, table: &Table) -> Value {
    let header = table.columns.iter().map(|c| Value::from(c.as_str())).collect();
    let rows: Vec<Value> = std::iter::once(Value::Array(header))
        .chain(
            table
                .rows
                .iter()
                .map(|row| Value::Array(row.iter().map(cell_value).collect())),
        )
        .collect();
    json!({ "range": range, "values": rows })
}

impl SheetPort for GoogleSheetsAdapter {
    fn write_table(&self, worksheet: &str, table: &Table) -> Result<(), AlgoError> {
        let existing = self.existing_sheet_id(worksheet)?;
        if existing.is_some() {
            log::debug!("replacing existing worksheet '{worksheet}'");
        }

        let batch = format!("{}:batchUpdate", self.spreadsheet_id);
        let batch_url = self.url(worksheet, &[batch.as_str()])?;
        let resp = self
            .client
            .post(batch_url)
            .bearer_auth(&self.access_token)
            .json(&replace_requests(existing, worksheet, table))
            .send()?;
        Self::check(worksheet, resp)?;

        let range = format!("'{worksheet}'!A1");
        let mut values_url =
            self.url(worksheet, &[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        values_url
            .query_pairs_mut()
            .append_pair("valueInputOption", "RAW");
        let resp = self
            .client
            .put(values_url)
            .bearer_auth(&self.access_token)
            .json(&values_body(&range, table))
            .send()?;
        Self::check(worksheet, resp)?;

        log::info!("wrote {} rows to worksheet '{worksheet}'", table.len());
        Ok(())
    }
}
