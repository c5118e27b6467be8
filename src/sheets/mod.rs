//! Tabular data source over the Google Sheets and Drive APIs.
//!
//! Documents are opened by name: a Drive query resolves the spreadsheet id,
//! then the values endpoint returns the worksheet grid. The first row is the
//! header and every following row becomes a JSON object keyed by header, with
//! missing trailing cells filled with empty strings. No schema is enforced
//! here; the transformation pipeline owns all typing.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::error::{SheetsError, SheetsResult};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Upper bound on any single API round trip.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared HTTP client with the bounded timeout applied.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

// =============================================================================
// API response shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct DriveFilesResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

// =============================================================================
// Client
// =============================================================================

/// Request-scoped Sheets client carrying one bearer token.
///
/// Constructed fresh for every dashboard request; nothing is cached between
/// requests.
pub struct SheetsClient {
    http: reqwest::Client,
    token: String,
}

impl SheetsClient {
    pub fn new(http: reqwest::Client, token: String) -> Self {
        Self { http, token }
    }

    /// Fetch a worksheet as header-keyed row objects.
    pub async fn fetch_table(
        &self,
        document: &str,
        worksheet: &str,
    ) -> SheetsResult<Vec<Map<String, Value>>> {
        let spreadsheet_id = self.resolve_document(document).await?;
        let values = self.fetch_values(&spreadsheet_id, worksheet).await?;

        if values.is_empty() {
            return Err(SheetsError::WorksheetNotFound(worksheet.to_string()));
        }

        Ok(rows_from_values(&values))
    }

    /// Resolve a spreadsheet document by name through the Drive files API.
    async fn resolve_document(&self, document: &str) -> SheetsResult<String> {
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            document.replace('\'', "\\'")
        );

        let response = self
            .http
            .get(DRIVE_FILES_URL)
            .bearer_auth(&self.token)
            .query(&[("q", query.as_str()), ("fields", "files(id)"), ("pageSize", "1")])
            .send()
            .await
            .map_err(|e| SheetsError::HttpError(e.to_string()))?;

        let body = check_status(response).await?;
        let parsed: DriveFilesResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::InvalidResponse(e.to_string()))?;

        parsed
            .files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| SheetsError::DocumentNotFound(document.to_string()))
    }

    /// Fetch the raw value grid for one worksheet.
    async fn fetch_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> SheetsResult<Vec<Vec<Value>>> {
        let mut url = reqwest::Url::parse(SHEETS_BASE_URL)
            .map_err(|e| SheetsError::InvalidResponse(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidResponse("bad base url".into()))?
            .push(spreadsheet_id)
            .push("values")
            .push(worksheet);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SheetsError::HttpError(e.to_string()))?;

        if response.status().as_u16() == 400 {
            // The values endpoint answers 400 for an unknown sheet name.
            return Err(SheetsError::WorksheetNotFound(worksheet.to_string()));
        }

        let body = check_status(response).await?;
        let parsed: ValuesResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::InvalidResponse(e.to_string()))?;

        Ok(parsed.values)
    }
}

/// Map a non-success status to [`SheetsError::ApiError`], else return the body.
async fn check_status(response: reqwest::Response) -> SheetsResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SheetsError::HttpError(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(body);
        return Err(SheetsError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}

// =============================================================================
// Row mapping
// =============================================================================

/// Convert a raw value grid into header-keyed row objects.
///
/// The first row supplies the column names. Rows shorter than the header are
/// padded with empty strings; extra cells beyond the header are ignored;
/// fully blank rows are skipped.
pub fn rows_from_values(values: &[Vec<Value>]) -> Vec<Map<String, Value>> {
    let Some((header_row, data_rows)) = values.split_first() else {
        return Vec::new();
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for row in data_rows {
        if row.iter().all(|cell| cell_to_string(cell).trim().is_empty()) {
            continue;
        }

        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let cell = row.get(i).cloned().unwrap_or_else(|| json!(""));
            obj.insert(header.clone(), cell);
        }
        rows.push(obj);
    }

    rows
}

/// String view of a cell, for headers and blank-row detection.
fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<Value>> {
        rows.iter()
            .map(|r| r.iter().map(|c| json!(c)).collect())
            .collect()
    }

    #[test]
    fn test_rows_from_values_basic() {
        let values = grid(&[
            &["Booking ID", "Address"],
            &["BK-1", "1 Main St"],
            &["BK-2", "2 Oak Ave"],
        ]);
        let rows = rows_from_values(&values);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Booking ID"], "BK-1");
        assert_eq!(rows[1]["Address"], "2 Oak Ave");
    }

    #[test]
    fn test_short_rows_padded_with_blanks() {
        let values = grid(&[&["A", "B", "C"], &["1"]]);
        let rows = rows_from_values(&values);

        assert_eq!(rows[0]["A"], "1");
        assert_eq!(rows[0]["B"], "");
        assert_eq!(rows[0]["C"], "");
    }

    #[test]
    fn test_extra_cells_ignored() {
        let values = grid(&[&["A", "B"], &["1", "2", "3", "4"]]);
        let rows = rows_from_values(&values);

        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0]["B"], "2");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let values = grid(&[&["A", "B"], &["1", "2"], &["", ""], &["3", "4"]]);
        let rows = rows_from_values(&values);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["A"], "3");
    }

    #[test]
    fn test_numeric_cells_preserved() {
        let values = vec![
            vec![json!("Days From Lease End Date")],
            vec![json!(7)],
        ];
        let rows = rows_from_values(&values);

        assert_eq!(rows[0]["Days From Lease End Date"], json!(7));
    }

    #[test]
    fn test_headers_trimmed_and_blank_headers_dropped() {
        let values = grid(&[&[" Name ", ""], &["Alice", "ignored"]]);
        let rows = rows_from_values(&values);

        assert_eq!(rows[0]["Name"], "Alice");
        assert_eq!(rows[0].len(), 1);
    }

    #[test]
    fn test_empty_grid() {
        assert!(rows_from_values(&[]).is_empty());
    }
}
