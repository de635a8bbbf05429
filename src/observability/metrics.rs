//! Metrics collection and exposition.
//!
//! # Metrics
//! - `harvester_actions_total` (counter): outcomes by action and result
//! - `harvester_gas_fallback_total` (counter): fallbacks by kind (gas_price, gas_limit)
//! - `harvester_rounds_total` (counter): completed rounds
//! - `harvester_wallets` (gauge): wallets loaded at startup
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Prometheus exposition is opt-in via `observability.metrics_enabled`

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_action(action: &'static str, result: &'static str) {
    metrics::counter!("harvester_actions_total", "action" => action, "result" => result)
        .increment(1);
}

pub fn record_gas_fallback(kind: &'static str) {
    metrics::counter!("harvester_gas_fallback_total", "kind" => kind).increment(1);
}

pub fn record_round_completed() {
    metrics::counter!("harvester_rounds_total").increment(1);
}

pub fn record_wallets(count: usize) {
    metrics::gauge!("harvester_wallets").set(count as f64);
}
