//! Metrics collection and exposition.
//!
//! # Metrics
//! - `security_bundle_activations_total` (counter): bundle runs by terminal state
//! - `security_filter_decisions_total` (counter): filter outcomes
//!
//! # Design Decisions
//! - Prometheus exporter only when enabled in config
//! - Recording without an installed recorder is a no-op

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Count one bundle run ending in `state` (absent, disabled, activated).
pub fn record_activation(state: &'static str) {
    metrics::counter!("security_bundle_activations_total", "state" => state).increment(1);
}

/// Count one security filter decision.
pub fn record_filter_decision(outcome: &'static str) {
    metrics::counter!("security_filter_decisions_total", "outcome" => outcome).increment(1);
}
