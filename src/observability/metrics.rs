//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_lookups_total` (counter): lookups by `outcome` (found, not_registered, file_unavailable)
//! - `config_refreshes_total` (counter): refreshes by `result` (ok, sync_error, load_error, interrupted)
//! - `config_refresh_duration_seconds` (histogram): sync + load latency
//! - `config_index_entries` (gauge): entries in the active index
//! - `webhook_rejections_total` (counter): refused refresh requests by `reason`
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!("config_lookups_total", "Configuration lookups by outcome");
    metrics::describe_counter!("config_refreshes_total", "Mirror refreshes by result");
    metrics::describe_histogram!(
        "config_refresh_duration_seconds",
        "Time spent syncing the mirror and reloading the index"
    );
    metrics::describe_gauge!("config_index_entries", "Entries in the active index");
    metrics::describe_counter!("webhook_rejections_total", "Refused refresh requests by reason");

    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

pub fn record_lookup(outcome: &'static str) {
    metrics::counter!("config_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_refresh(result: &'static str, started: Instant) {
    metrics::counter!("config_refreshes_total", "result" => result).increment(1);
    metrics::histogram!("config_refresh_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_index_size(entries: usize) {
    metrics::gauge!("config_index_entries").set(entries as f64);
}

pub fn record_webhook_rejection(reason: &'static str) {
    metrics::counter!("webhook_rejections_total", "reason" => reason).increment(1);
}
