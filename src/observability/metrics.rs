//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): requests by backend, status
//! - `balancer_request_duration_seconds` (histogram): latency distribution
//! - `balancer_backend_health` (gauge): 1=healthy, 0=unhealthy
//! - `balancer_health_transitions_total` (counter): flag changes by backend
//! - `balancer_observers` (gauge): connected feed observers
//! - `balancer_observers_dropped_total` (counter): observers removed on send failure
//! - `balancer_events_published_total` (counter): events by kind
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op (tests, disabled exporter)

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(backend: &str, status: u16, start: Instant) {
    counter!(
        "balancer_requests_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("balancer_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("balancer_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_health_transition(backend: &str) {
    counter!("balancer_health_transitions_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_observers(count: usize) {
    gauge!("balancer_observers").set(count as f64);
}

pub fn record_observers_dropped(count: usize) {
    counter!("balancer_observers_dropped_total").increment(count as u64);
}

pub fn record_event_published(kind: &'static str) {
    counter!("balancer_events_published_total", "kind" => kind).increment(1);
}
