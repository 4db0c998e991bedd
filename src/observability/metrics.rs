//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cache_requests_total` (counter): lookups by `result` (hit/miss) and `source`
//! - `cache_errors_total` (counter): store or decode failures by `op`
//! - `cache_response_seconds` (histogram): lookup latency
//! - `cache_local_entries` (gauge): entries held by the fallback map
//! - `store_connected` (gauge): 1=connected, 0=disconnected
//! - `store_probe_latency_ms` (gauge): last successful probe round-trip
//! - `job_lock_operations_total` (counter): acquire/release outcomes
//! - `rate_limited_total` (counter): denials by `limiter`
//!
//! # Design Decisions
//! - Uses the `metrics` facade; without an installed recorder these are no-ops
//! - Prometheus exporter is optional and configured at startup

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cache_lookup(result: &'static str, source: &'static str, elapsed: Duration) {
    counter!("cache_requests_total", "result" => result, "source" => source).increment(1);
    histogram!("cache_response_seconds").record(elapsed.as_secs_f64());
}

pub fn record_cache_error(op: &'static str) {
    counter!("cache_errors_total", "op" => op).increment(1);
}

pub fn record_local_entries(count: usize) {
    gauge!("cache_local_entries").set(count as f64);
}

pub fn record_store_health(connected: bool, latency_ms: Option<u64>) {
    gauge!("store_connected").set(if connected { 1.0 } else { 0.0 });
    if let Some(latency) = latency_ms {
        gauge!("store_probe_latency_ms").set(latency as f64);
    }
}

pub fn record_lock_operation(op: &'static str, outcome: &'static str) {
    counter!("job_lock_operations_total", "op" => op, "outcome" => outcome).increment(1);
}

pub fn record_rate_limited(limiter: &'static str) {
    counter!("rate_limited_total", "limiter" => limiter).increment(1);
}
