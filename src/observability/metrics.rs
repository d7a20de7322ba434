//! Metrics collection and exposition.
//!
//! # Metrics
//! - `notif_observations_total` (counter): observations by outcome
//! - `notif_notifications_total` (counter): backend calls by action and result
//! - `notif_store_errors_total` (counter): store failures by operation
//! - `notif_memo_entries` (gauge): memoized checks held by this instance
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are low-cardinality; check keys never become labels

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "metrics endpoint listening");
    Ok(())
}

pub fn record_observation(outcome: &'static str) {
    metrics::counter!("notif_observations_total", "outcome" => outcome).increment(1);
}

pub fn record_notification(action: &'static str, success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("notif_notifications_total", "action" => action, "result" => result)
        .increment(1);
}

pub fn record_store_error(op: &'static str) {
    metrics::counter!("notif_store_errors_total", "op" => op).increment(1);
}

pub fn record_memo_size(size: usize) {
    metrics::gauge!("notif_memo_entries").set(size as f64);
}
