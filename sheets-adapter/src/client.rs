//! Sheets v4 REST client

use crate::{
    auth::{Authenticator, Credentials},
    types::{BatchUpdateRequest, ErrorResponse, Request, Spreadsheet, ValueRange},
    Error, Result, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECONDS,
};
use async_trait::async_trait;
use ledger_core::{CellRange, Row, SheetInfo, SheetStore, StructuralRequest, ValueInput};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Field mask for document metadata
const METADATA_FIELDS: &str = "properties.title,sheets.properties(sheetId,title)";

/// Client settings
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Document id from the spreadsheet URL
    pub spreadsheet_id: String,
    /// API root, overridable for tests
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl SheetsConfig {
    /// Settings for a document with the public endpoint
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }

    /// Point at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Google Sheets document as a [`SheetStore`]
#[derive(Debug)]
pub struct SheetsClient {
    http: reqwest::Client,
    auth: Authenticator,
    document_url: Url,
    name: String,
}

impl SheetsClient {
    /// Client for one document
    pub fn new(config: SheetsConfig, credentials: Credentials) -> Result<Self> {
        if config.spreadsheet_id.is_empty() {
            return Err(Error::Config("spreadsheet id is empty".to_string()));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        let mut document_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base url {}: {}", config.base_url, e)))?;
        document_url
            .path_segments_mut()
            .map_err(|_| Error::Config(format!("base url cannot hold a path: {}", config.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", config.spreadsheet_id.as_str()]);

        Ok(Self {
            auth: Authenticator::new(credentials, http.clone()),
            http,
            document_url,
            name: format!("sheets:{}", config.spreadsheet_id),
        })
    }

    /// Document title and tabs, as one metadata call
    pub async fn metadata(&self) -> Result<Spreadsheet> {
        let mut url = self.document_url.clone();
        url.query_pairs_mut().append_pair("fields", METADATA_FIELDS);
        self.send_json(self.request(Method::GET, url).await?).await
    }

    fn url_with(&self, segment: &str) -> Url {
        let mut url = self.document_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(segment);
        }
        url
    }

    /// `.../{id}:batchUpdate` style suffix on the document segment itself
    fn document_method_url(&self, method: &str) -> Url {
        let mut url = self.document_url.clone();
        let path = format!("{}:{}", url.path(), method);
        url.set_path(&path);
        url
    }

    fn values_url(&self, range: &CellRange, suffix: &str) -> Url {
        let mut url = self.url_with("values");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&format!("{}{}", range, suffix));
        }
        url
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.auth.bearer_token().await?;
        debug!("{} {}", method, url);
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        error!("Sheets API returned {}: {}", status, message);
        Err(Error::SheetsApi {
            status_code: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_values(&self, range: &CellRange) -> Result<Vec<Row>> {
        let url = self.values_url(range, "");
        let values: ValueRange = self.send_json(self.request(Method::GET, url).await?).await?;
        Ok(values.into_rows())
    }

    async fn append_values(&self, range: &CellRange, rows: Vec<Row>, input: ValueInput) -> Result<()> {
        let mut url = self.values_url(range, ":append");
        url.query_pairs_mut()
            .append_pair("valueInputOption", input.as_str())
            .append_pair("insertDataOption", "INSERT_ROWS");
        let body = ValueRange::rows(range.to_string(), rows);
        self.send(self.request(Method::POST, url).await?.json(&body))
            .await?;
        Ok(())
    }

    async fn update_values(&self, range: &CellRange, rows: Vec<Row>, input: ValueInput) -> Result<()> {
        let mut url = self.values_url(range, "");
        url.query_pairs_mut()
            .append_pair("valueInputOption", input.as_str());
        let body = ValueRange::rows(range.to_string(), rows);
        self.send(self.request(Method::PUT, url).await?.json(&body))
            .await?;
        Ok(())
    }

    async fn post_batch_update(&self, requests: Vec<StructuralRequest>) -> Result<()> {
        if requests.is_empty() {
            warn!("Skipping empty batch update");
            return Ok(());
        }
        let body = BatchUpdateRequest {
            requests: requests.into_iter().map(Request::from).collect(),
        };
        let url = self.document_method_url("batchUpdate");
        self.send(self.request(Method::POST, url).await?.json(&body))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn sheets(&self) -> ledger_core::Result<Vec<SheetInfo>> {
        Ok(self.metadata().await?.sheet_infos())
    }

    async fn read(&self, range: &CellRange) -> ledger_core::Result<Vec<Row>> {
        Ok(self.get_values(range).await?)
    }

    async fn append(
        &self,
        range: &CellRange,
        rows: Vec<Row>,
        input: ValueInput,
    ) -> ledger_core::Result<()> {
        Ok(self.append_values(range, rows, input).await?)
    }

    async fn update(
        &self,
        range: &CellRange,
        rows: Vec<Row>,
        input: ValueInput,
    ) -> ledger_core::Result<()> {
        Ok(self.update_values(range, rows, input).await?)
    }

    async fn batch_update(&self, requests: Vec<StructuralRequest>) -> ledger_core::Result<()> {
        Ok(self.post_batch_update(requests).await?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> SheetsClient {
        SheetsClient::new(
            SheetsConfig::new("doc123").with_base_url(base),
            Credentials::StaticToken("t".into()),
        )
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let c = client("https://sheets.example.com");
        assert_eq!(
            c.values_url(&CellRange::columns("Sheet1", 0, 12), "").as_str(),
            "https://sheets.example.com/v4/spreadsheets/doc123/values/Sheet1!A:M"
        );
        assert_eq!(
            c.values_url(&CellRange::columns("Sheet1", 0, 12), ":append").as_str(),
            "https://sheets.example.com/v4/spreadsheets/doc123/values/Sheet1!A:M:append"
        );
        assert_eq!(
            c.document_method_url("batchUpdate").as_str(),
            "https://sheets.example.com/v4/spreadsheets/doc123:batchUpdate"
        );
    }

    #[test]
    fn test_base_url_with_trailing_slash() {
        let c = client("http://127.0.0.1:9000/");
        assert_eq!(
            c.document_url.as_str(),
            "http://127.0.0.1:9000/v4/spreadsheets/doc123"
        );
    }

    #[test]
    fn test_quoted_title_is_encoded() {
        let c = client("https://sheets.example.com");
        let url = c.values_url(&CellRange::columns("판매 기록", 0, 1), "");
        assert!(url.as_str().ends_with("/values/'%ED%8C%90%EB%A7%A4%20%EA%B8%B0%EB%A1%9D'!A:B"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = SheetsClient::new(SheetsConfig::new(""), Credentials::StaticToken("t".into()));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
