// Geumga Ledger Gateway - HTTP entry point for the sales ledger UI
// Serves the ledger, settings and statistics endpoints over a spreadsheet store

use ledger_core::Ledger;
use ledger_gateway::{
    build_router, build_store,
    config::{Config, LoggingConfig},
    AppState,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_line_number(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.logging);
    config.validate().map_err(anyhow::Error::msg)?;

    info!("Starting Geumga Ledger Gateway");

    let store = build_store(&config.store)?;
    let ledger = Ledger::new(store, config.layout.clone());

    if config.store.provision_on_start {
        // An unreachable document is not fatal: the service reports degraded
        // health and every request surfaces the store error.
        if let Err(e) = ledger.ensure_ledger_tab().await {
            warn!("Could not prepare ledger tab: {}", e);
        }
        if let Err(e) = ledger.provision_settings().await {
            warn!("Could not provision settings: {}", e);
        }
    }

    let app = build_router(AppState { ledger });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Gateway listening on: {}", config.server.bind_addr);
    info!("   POST   /api/save              - Record a sale");
    info!("   GET    /api/lookup            - Customer lookup");
    info!("   GET    /api/search            - Paged search");
    info!("   DELETE /api/delete            - Delete a row");
    info!("   GET    /api/next-customer-no  - Next customer number");
    info!("   GET    /api/stats             - Sales statistics");
    info!("   GET    /api/settings          - Settings");
    info!("   GET    /health                - Health check");
    info!("   GET    /metrics               - Prometheus metrics");

    axum::serve(listener, app).await?;

    Ok(())
}
