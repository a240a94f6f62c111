//! Sheets client against a mock API server

use httpmock::prelude::*;
use ledger_core::{
    CellRange, Ledger, LedgerLayout, RowId, SheetId, SheetStore, StructuralRequest, ValueInput,
};
use serde_json::json;
use sheets_adapter::{Credentials, SheetsClient, SheetsConfig};
use std::sync::Arc;

const DOC: &str = "/v4/spreadsheets/doc123";

fn client(server: &MockServer) -> SheetsClient {
    SheetsClient::new(
        SheetsConfig::new("doc123").with_base_url(server.base_url()),
        Credentials::StaticToken("test-token".into()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_read_converts_cells_to_text() {
    let server = MockServer::start_async().await;
    let get = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{}/values/Sheet1!A:M", DOC))
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(json!({
                "range": "Sheet1!A1:M2",
                "majorDimension": "ROWS",
                "values": [
                    ["판매일자", "고객명"],
                    ["2024-03-02", "김민지", "C-1001", "010-1234-5678", "", "반지", 150000]
                ]
            }));
        })
        .await;

    let rows = client(&server)
        .read(&CellRange::columns("Sheet1", 0, 12))
        .await
        .unwrap();

    get.assert_async().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][6], "150000");
    assert_eq!(rows[1][4], "");
}

#[tokio::test]
async fn test_read_empty_range() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/values/Settings!A:B", DOC));
            then.status(200)
                .json_body(json!({"range": "Settings!A1:B1000", "majorDimension": "ROWS"}));
        })
        .await;

    let rows = client(&server)
        .read(&CellRange::columns("Settings", 0, 1))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_append_uses_user_entered() {
    let server = MockServer::start_async().await;
    let append = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}/values/Sheet1!A:M:append", DOC))
                .query_param("valueInputOption", "USER_ENTERED")
                .json_body(json!({
                    "range": "Sheet1!A:M",
                    "majorDimension": "ROWS",
                    "values": [["2024-03-02", "김민지"]]
                }));
            then.status(200).json_body(json!({"spreadsheetId": "doc123"}));
        })
        .await;

    client(&server)
        .append(
            &CellRange::columns("Sheet1", 0, 12),
            vec![vec!["2024-03-02".into(), "김민지".into()]],
            ValueInput::UserEntered,
        )
        .await
        .unwrap();
    append.assert_async().await;
}

#[tokio::test]
async fn test_update_single_cell_raw() {
    let server = MockServer::start_async().await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(format!("{}/values/Settings!B3", DOC))
                .query_param("valueInputOption", "RAW")
                .json_body(json!({
                    "range": "Settings!B3",
                    "majorDimension": "ROWS",
                    "values": [["금가보석"]]
                }));
            then.status(200).json_body(json!({"updatedCells": 1}));
        })
        .await;

    client(&server)
        .update(
            &CellRange::cell("Settings", 1, 3),
            vec![vec!["금가보석".into()]],
            ValueInput::Raw,
        )
        .await
        .unwrap();
    update.assert_async().await;
}

#[tokio::test]
async fn test_batch_update_delete_rows() {
    let server = MockServer::start_async().await;
    let batch = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}:batchUpdate", DOC))
                .json_body(json!({
                    "requests": [{"deleteDimension": {"range": {
                        "sheetId": 0,
                        "dimension": "ROWS",
                        "startIndex": 4,
                        "endIndex": 5
                    }}}]
                }));
            then.status(200).json_body(json!({"replies": [{}]}));
        })
        .await;

    client(&server)
        .batch_update(vec![StructuralRequest::DeleteRows {
            sheet_id: SheetId(0),
            start_index: 4,
            end_index: 5,
        }])
        .await
        .unwrap();
    batch.assert_async().await;
}

#[tokio::test]
async fn test_api_error_maps_to_store_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/values/Sheet1!A:M", DOC));
            then.status(403).json_body(json!({
                "error": {
                    "code": 403,
                    "message": "The caller does not have permission",
                    "status": "PERMISSION_DENIED"
                }
            }));
        })
        .await;

    let err = client(&server)
        .read(&CellRange::columns("Sheet1", 0, 12))
        .await
        .unwrap_err();
    match err {
        ledger_core::Error::StoreUnavailable(msg) => {
            assert!(msg.contains("403"), "{}", msg);
            assert!(msg.contains("does not have permission"), "{}", msg);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_garbled_body_is_json_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/values/Sheet1!A:M", DOC));
            then.status(200).body("<html>proxy login</html>");
        })
        .await;

    let err = client(&server)
        .read(&CellRange::columns("Sheet1", 0, 12))
        .await
        .unwrap_err();
    match err {
        ledger_core::Error::StoreUnavailable(msg) => assert!(msg.starts_with("JSON error"), "{}", msg),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_ledger_delete_resolves_sheet_id() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(DOC)
                .query_param_exists("fields");
            then.status(200).json_body(json!({
                "properties": {"title": "금가 판매대장"},
                "sheets": [
                    {"properties": {"sheetId": 0, "title": "Settings"}},
                    {"properties": {"sheetId": 1337, "title": "Sheet1"}}
                ]
            }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}:batchUpdate", DOC))
                .json_body(json!({
                    "requests": [{"deleteDimension": {"range": {
                        "sheetId": 1337,
                        "dimension": "ROWS",
                        "startIndex": 2,
                        "endIndex": 3
                    }}}]
                }));
            then.status(200).json_body(json!({"replies": [{}]}));
        })
        .await;

    let ledger = Ledger::new(Arc::new(client(&server)), LedgerLayout::default());
    ledger
        .delete_transaction(RowId::new(3).unwrap())
        .await
        .unwrap();
    delete.assert_async().await;
}

#[tokio::test]
async fn test_password_written_raw_keeps_leading_zero() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(DOC)
                .query_param_exists("fields");
            then.status(200).json_body(json!({
                "properties": {"title": "금가 판매대장"},
                "sheets": [
                    {"properties": {"sheetId": 0, "title": "Sheet1"}},
                    {"properties": {"sheetId": 7, "title": "Settings"}}
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/values/Settings!A:B", DOC));
            then.status(200).json_body(json!({
                "range": "Settings!A1:B7",
                "majorDimension": "ROWS",
                "values": [
                    ["Key", "Value"],
                    ["simple_password", "123456"],
                    ["supplier_name", "금가보석"],
                    ["supplier_ceo", ""],
                    ["supplier_reg_no", ""],
                    ["supplier_address", ""],
                    ["supplier_phone", "0212345678"]
                ]
            }));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(format!("{}/values/Settings!B2", DOC))
                .query_param("valueInputOption", "RAW")
                .json_body(json!({
                    "range": "Settings!B2",
                    "majorDimension": "ROWS",
                    "values": [["012345"]]
                }));
            then.status(200).json_body(json!({"updatedCells": 1}));
        })
        .await;

    let ledger = Ledger::new(Arc::new(client(&server)), LedgerLayout::default());
    ledger.update_password("012345").await.unwrap();
    update.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_server_is_store_error() {
    let client = SheetsClient::new(
        SheetsConfig::new("doc123").with_base_url("http://127.0.0.1:1"),
        Credentials::StaticToken("t".into()),
    )
    .unwrap();
    let err = client.sheets().await.unwrap_err();
    assert!(matches!(err, ledger_core::Error::StoreUnavailable(_)));
}
