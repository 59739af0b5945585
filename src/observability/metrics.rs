//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lifecycle_component_starts_total` (counter): start attempts by component, outcome
//! - `lifecycle_component_start_duration_seconds` (histogram): start latency by component
//! - `lifecycle_component_stops_total` (counter): stop attempts by component, outcome
//! - `lifecycle_started_components` (gauge): components currently started
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

pub fn record_start(component: &str, ok: bool, elapsed: Duration) {
    metrics::counter!(
        "lifecycle_component_starts_total",
        "component" => component.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
    metrics::histogram!(
        "lifecycle_component_start_duration_seconds",
        "component" => component.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_stop(component: &str, ok: bool) {
    metrics::counter!(
        "lifecycle_component_stops_total",
        "component" => component.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn set_started_components(count: usize) {
    metrics::gauge!("lifecycle_started_components").set(count as f64);
}
