// JSON endpoints over the ledger
//
// Every response carries `success`; failures use the `ApiError` envelope.

use crate::{error::ApiError, metrics::METRICS, AppState};
use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use ledger_core::{
    cell::{parse_date, parse_number},
    Amounts, DateRange, RowId, SearchQuery, SettingUpdate, TransactionDraft,
};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::{debug, info};

type ApiResult = Result<Json<Value>, ApiError>;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}

/// Accept amounts as JSON numbers or display text such as `"₩350,000"`
fn lenient_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => {
            let text = n.to_string();
            Some(
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .unwrap_or_default(),
            )
        }
        Some(Value::String(s)) if !s.trim().is_empty() => Some(parse_number(&s)),
        _ => None,
    })
}

/// Body of `POST /api/save`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveRequest {
    pub sale_date: String,
    pub customer_name: String,
    pub customer_no: String,
    pub phone: String,
    pub address: Option<String>,
    pub product_name: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub unit_price: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub quantity: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub supply_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub vat: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub total_amount: Option<Decimal>,
    pub remarks: Option<String>,
    pub transaction_type: Option<String>,
}

impl SaveRequest {
    fn into_draft(self) -> Result<(TransactionDraft, Amounts), ApiError> {
        let unit_price = self.unit_price.unwrap_or_default();
        let quantity = self.quantity.unwrap_or_default();
        let amounts = Amounts::complete(
            unit_price,
            quantity,
            self.supply_amount,
            self.vat,
            self.total_amount,
        )?;
        let draft = TransactionDraft {
            sale_date: self.sale_date,
            customer_name: self.customer_name,
            customer_no: self.customer_no,
            phone: self.phone,
            address: self.address,
            product_name: self.product_name,
            unit_price,
            quantity,
            remarks: self.remarks,
            transaction_type: self.transaction_type,
        };
        Ok((draft, amounts))
    }
}

pub async fn save(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: SaveRequest = parse_body(&body)?;
    let (draft, amounts) = request.into_draft()?;
    let record = draft.into_record_with(amounts);

    state.ledger.append_transaction(&record).await?;
    METRICS.transactions_saved_total.inc();
    info!(
        "Saved sale for {} ({}): total {}",
        record.customer_no, record.product_name, record.total_amount
    );

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LookupParams {
    pub name: String,
    pub phone: String,
}

pub async fn lookup(State(state): State<AppState>, Query(params): Query<LookupParams>) -> ApiResult {
    let results = state
        .ledger
        .lookup_transactions(&params.name, &params.phone)
        .await?;
    Ok(Json(json!({ "success": true, "results": results })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: String,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn parse_count(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult {
    let query = SearchQuery::new(params.q).page(
        parse_count(params.page.as_deref(), 1),
        parse_count(params.limit.as_deref(), ledger_core::search::DEFAULT_PAGE_SIZE),
    );
    let page = state.ledger.search_transactions(&query).await?;
    Ok(Json(json!({
        "success": true,
        "results": page.results,
        "total": page.total,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteParams {
    pub row_id: Option<String>,
}

/// Leading digits of a row id, so `3abc` and `3.0` both read as 3
fn parse_row_number(value: &str) -> Option<u32> {
    let value = value.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

pub async fn delete(State(state): State<AppState>, Query(params): Query<DeleteParams>) -> ApiResult {
    let row_id = params
        .row_id
        .as_deref()
        .and_then(parse_row_number)
        .filter(|v| *v > 0)
        .ok_or_else(|| ApiError::bad_request("Row ID required"))?;
    let row_id = RowId::new(row_id)?;

    state.ledger.delete_transaction(row_id).await?;
    METRICS.transactions_deleted_total.inc();
    Ok(Json(json!({ "success": true })))
}

pub async fn next_customer_no(State(state): State<AppState>) -> ApiResult {
    let next = state.ledger.next_customer_number().await?;
    Ok(Json(json!({ "success": true, "nextNo": next })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_bound(value: Option<&str>, name: &str) -> Result<Option<chrono::NaiveDate>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => parse_date(v)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid {}: {}", name, v))),
    }
}

pub async fn stats(State(state): State<AppState>, Query(params): Query<StatsParams>) -> ApiResult {
    let range = DateRange::new(
        parse_bound(params.start_date.as_deref(), "startDate")?,
        parse_bound(params.end_date.as_deref(), "endDate")?,
    );
    let stats = state.ledger.sales_stats(&range).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

pub async fn get_settings(State(state): State<AppState>) -> ApiResult {
    let settings = state.ledger.get_settings().await?;
    Ok(Json(json!({ "success": true, "settings": settings })))
}

fn setting_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub async fn update_supplier(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let fields: serde_json::Map<String, Value> = parse_body(&body)?;
    let updates: Vec<SettingUpdate> = fields
        .into_iter()
        .map(|(key, value)| SettingUpdate::new(key, setting_text(value)))
        .collect();
    debug!("Updating {} settings", updates.len());

    state.ledger.update_settings(&updates).await?;
    METRICS.settings_updates_total.inc();
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordRequest {
    pub password: String,
}

pub async fn update_password(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: PasswordRequest = parse_body(&body)?;
    if request.password.is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }

    state.ledger.update_password(&request.password).await?;
    METRICS.settings_updates_total.inc();
    Ok(Json(json!({ "success": true })))
}

pub async fn verify_password(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: PasswordRequest = parse_body(&body)?;
    let accepted = state.ledger.verify_password(&request.password).await?;
    METRICS.track_password_check(accepted);
    Ok(Json(json!({ "success": accepted })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub store: String,
    pub store_connected: bool,
    pub ledger_tab_present: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let tabs = state.ledger.tab_titles().await;
    let store_connected = tabs.is_ok();
    let ledger_tab_present = tabs
        .map(|t| t.contains(&state.ledger.layout().ledger_tab))
        .unwrap_or(false);

    Json(HealthResponse {
        status: if store_connected && ledger_tab_present { "healthy" } else { "degraded" },
        service: "ledger-gateway",
        version: env!("CARGO_PKG_VERSION"),
        store: state.ledger.store_name().to_string(),
        store_connected,
        ledger_tab_present,
    })
}

pub async fn metrics_handler() -> Result<String, ApiError> {
    METRICS
        .export()
        .map_err(|e| ApiError::Internal(format!("Failed to export metrics: {}", e)))
}
