// Ledger Gateway Library
// Exposes the router and store wiring for the binary and for tests

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;

use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use crate::config::{StoreBackend, StoreConfig};
use ledger_core::{Ledger, MemorySheetStore, SheetStore};
use sheets_adapter::{Credentials, ServiceAccountKey, SheetsClient, SheetsConfig};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[derive(Clone, Debug)]
pub struct AppState {
    pub ledger: Ledger,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/save", post(handlers::save))
        .route("/api/lookup", get(handlers::lookup))
        .route("/api/search", get(handlers::search))
        .route("/api/delete", delete(handlers::delete))
        .route("/api/next-customer-no", get(handlers::next_customer_no))
        .route("/api/stats", get(handlers::stats))
        .route("/api/settings", get(handlers::get_settings))
        .route("/api/settings/supplier", post(handlers::update_supplier))
        .route("/api/settings/password", post(handlers::update_password))
        .route("/api/auth/verify", post(handlers::verify_password))
        .route_layer(middleware::from_fn(metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn credentials(config: &StoreConfig) -> anyhow::Result<Credentials> {
    if let Some(token) = config.access_token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(Credentials::StaticToken(token.to_string()));
    }

    let json = match config.service_account_key.as_deref().filter(|k| !k.is_empty()) {
        Some(json) => json.to_string(),
        None => {
            let path = config
                .service_account_key_file
                .as_deref()
                .context("no service account key configured")?;
            std::fs::read_to_string(path)
                .with_context(|| format!("reading service account key {}", path))?
        }
    };
    Ok(Credentials::ServiceAccount(ServiceAccountKey::from_json(&json)?))
}

/// Store selected by configuration
pub fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn SheetStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemorySheetStore::new()))
        }
        StoreBackend::Sheets => {
            let sheets = SheetsConfig {
                spreadsheet_id: config.spreadsheet_id.clone(),
                base_url: config.base_url.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
            };
            let client = SheetsClient::new(sheets, credentials(config)?)?;
            info!("Using Google Sheets document {}", config.spreadsheet_id);
            Ok(Arc::new(client))
        }
    }
}
