//! Sheets v4 wire types
//!
//! Only the fields the ledger reads or writes are modelled.

use ledger_core::{SheetId, SheetInfo, StructuralRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `spreadsheets.get` response, restricted by a field mask
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Spreadsheet {
    /// Document properties
    #[serde(default)]
    pub properties: Option<SpreadsheetProperties>,
    /// Tabs
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

/// Document properties
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpreadsheetProperties {
    /// Document title
    #[serde(default)]
    pub title: String,
}

/// One tab
#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    /// Tab properties
    pub properties: SheetProperties,
}

/// Tab properties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// Numeric id; absent when creating a tab
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
    /// Tab title
    pub title: String,
}

impl Spreadsheet {
    /// Tabs as ledger metadata
    pub fn sheet_infos(&self) -> Vec<SheetInfo> {
        self.sheets
            .iter()
            .map(|s| SheetInfo {
                sheet_id: SheetId(s.properties.sheet_id.unwrap_or_default()),
                title: s.properties.title.clone(),
            })
            .collect()
    }
}

/// A block of cell values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// A1 range the values belong to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// Always `ROWS` for the ledger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Rows of cells; omitted by the API when the range is empty
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Rows to write, row-major
    pub fn rows(range: String, rows: Vec<Vec<String>>) -> Self {
        Self {
            range: Some(range),
            major_dimension: Some("ROWS".to_string()),
            values: rows
                .into_iter()
                .map(|row| row.into_iter().map(Value::String).collect())
                .collect(),
        }
    }

    /// Cells as display text
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

/// Display text of one returned cell
pub fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `spreadsheets.batchUpdate` body
#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateRequest {
    /// Requests applied in order
    pub requests: Vec<Request>,
}

/// One structural request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    /// Create a tab
    AddSheet {
        /// New tab properties
        properties: SheetProperties,
    },
    /// Delete rows or columns
    DeleteDimension {
        /// Span to delete
        range: DimensionRange,
    },
}

/// Row or column span on a tab
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    /// Tab id
    pub sheet_id: i64,
    /// `ROWS` or `COLUMNS`
    pub dimension: String,
    /// 0-based, inclusive
    pub start_index: u32,
    /// 0-based, exclusive
    pub end_index: u32,
}

impl From<StructuralRequest> for Request {
    fn from(request: StructuralRequest) -> Self {
        match request {
            StructuralRequest::AddSheet { title } => Request::AddSheet {
                properties: SheetProperties {
                    sheet_id: None,
                    title,
                },
            },
            StructuralRequest::DeleteRows {
                sheet_id,
                start_index,
                end_index,
            } => Request::DeleteDimension {
                range: DimensionRange {
                    sheet_id: sheet_id.0,
                    dimension: "ROWS".to_string(),
                    start_index,
                    end_index,
                },
            },
        }
    }
}

/// Error envelope returned by Google APIs
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code
    #[serde(default)]
    pub code: u16,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Canonical status, e.g. `PERMISSION_DENIED`
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_range_cells_to_text() {
        let body = json!({
            "range": "Sheet1!A1:C2",
            "majorDimension": "ROWS",
            "values": [["판매일자", "고객명"], ["2024-01-05", 15000, true]]
        });
        let range: ValueRange = serde_json::from_value(body).unwrap();
        let rows = range.into_rows();
        assert_eq!(rows[0], vec!["판매일자", "고객명"]);
        assert_eq!(rows[1], vec!["2024-01-05", "15000", "true"]);
    }

    #[test]
    fn test_empty_range_has_no_values() {
        let range: ValueRange = serde_json::from_value(json!({
            "range": "Settings!A1:B1000",
            "majorDimension": "ROWS"
        }))
        .unwrap();
        assert!(range.into_rows().is_empty());
    }

    #[test]
    fn test_batch_update_shape() {
        let body = BatchUpdateRequest {
            requests: vec![
                StructuralRequest::AddSheet {
                    title: "Settings".into(),
                }
                .into(),
                StructuralRequest::DeleteRows {
                    sheet_id: SheetId(7),
                    start_index: 3,
                    end_index: 4,
                }
                .into(),
            ],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "requests": [
                    {"addSheet": {"properties": {"title": "Settings"}}},
                    {"deleteDimension": {"range": {
                        "sheetId": 7,
                        "dimension": "ROWS",
                        "startIndex": 3,
                        "endIndex": 4
                    }}}
                ]
            })
        );
    }

    #[test]
    fn test_sheet_infos() {
        let doc: Spreadsheet = serde_json::from_value(json!({
            "properties": {"title": "금가 판매대장"},
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1"}},
                {"properties": {"sheetId": 912, "title": "Settings"}}
            ]
        }))
        .unwrap();
        let infos = doc.sheet_infos();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[1].sheet_id, SheetId(912));
        assert_eq!(infos[1].title, "Settings");
    }
}
