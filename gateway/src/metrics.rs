// Prometheus Metrics for the Ledger Gateway
// Tracks: request throughput, latency, store failures, ledger writes

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry, register_int_gauge_with_registry, Counter, CounterVec,
    Encoder, HistogramOpts, HistogramVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub http_requests_in_flight: IntGauge,

    // Store metrics
    pub store_errors_total: Counter,

    // Business metrics
    pub transactions_saved_total: Counter,
    pub transactions_deleted_total: Counter,
    pub settings_updates_total: Counter,
    pub password_checks_total: CounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = register_counter_vec_with_registry!(
            Opts::new("ledger_http_requests_total", "Total HTTP requests processed"),
            &["method", "path", "status"],
            registry
        )?;

        let http_request_duration_seconds = register_histogram_vec_with_registry!(
            HistogramOpts::new(
                "ledger_http_request_duration_seconds",
                "HTTP request duration in seconds"
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["path"],
            registry
        )?;

        let http_requests_in_flight = register_int_gauge_with_registry!(
            Opts::new("ledger_http_requests_in_flight", "Current HTTP requests being processed"),
            registry
        )?;

        let store_errors_total = register_counter_with_registry!(
            Opts::new("ledger_store_errors_total", "Spreadsheet store calls that failed"),
            registry
        )?;

        let transactions_saved_total = register_counter_with_registry!(
            Opts::new("ledger_transactions_saved_total", "Transactions appended"),
            registry
        )?;

        let transactions_deleted_total = register_counter_with_registry!(
            Opts::new("ledger_transactions_deleted_total", "Transactions deleted"),
            registry
        )?;

        let settings_updates_total = register_counter_with_registry!(
            Opts::new("ledger_settings_updates_total", "Settings update requests"),
            registry
        )?;

        let password_checks_total = register_counter_vec_with_registry!(
            Opts::new("ledger_password_checks_total", "Password verifications by outcome"),
            &["result"],
            registry
        )?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            store_errors_total,
            transactions_saved_total,
            transactions_deleted_total,
            settings_updates_total,
            password_checks_total,
        })
    }

    /// Export all metrics in Prometheus text format
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Track a password verification
    pub fn track_password_check(&self, accepted: bool) {
        let result = if accepted { "accepted" } else { "rejected" };
        self.password_checks_total.with_label_values(&[result]).inc();
    }
}

// Global metrics instance
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Per-route request counting and latency
pub async fn track_requests(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let method = request.method().to_string();

    METRICS.http_requests_in_flight.inc();
    let timer = METRICS
        .http_request_duration_seconds
        .with_label_values(&[path.as_str()])
        .start_timer();

    let response = next.run(request).await;

    timer.observe_duration();
    METRICS.http_requests_in_flight.dec();
    METRICS
        .http_requests_total
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_contains_registered_metrics() {
        let metrics = Metrics::new().unwrap();
        metrics.transactions_saved_total.inc();
        metrics.track_password_check(false);

        let text = metrics.export().unwrap();
        assert!(text.contains("ledger_transactions_saved_total 1"));
        assert!(text.contains("ledger_password_checks_total{result=\"rejected\"} 1"));
    }
}
