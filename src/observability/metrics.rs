//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, target
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_target_available` (gauge): 1=available, 0=unavailable
//! - `proxy_target_inflight` (gauge): requests currently in flight per target

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, target: &str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "target" => target.to_string()
    )
    .increment(1);
    histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "target" => target.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a health probe outcome for one target.
pub fn record_target_availability(target: SocketAddr, available: bool) {
    gauge!(
        "proxy_target_available",
        "target" => target.to_string()
    )
    .set(if available { 1.0 } else { 0.0 });
}

/// Record the number of requests currently in flight on one target.
pub fn record_target_inflight(target: SocketAddr, load: usize) {
    gauge!(
        "proxy_target_inflight",
        "target" => target.to_string()
    )
    .set(load as f64);
}
