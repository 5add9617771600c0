//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wallet_rpc_session_alive` (gauge): 1 when the last probe succeeded
//! - `wallet_reconnects_total` (counter): reconnect attempts by result
//! - `wallet_transfers_total` (counter): finished transfers by outcome
//! - `wallet_gas_fallback_total` (counter): transfers that used the default gas limit
//!
//! Without an installed recorder every call is a no-op, so recording is
//! unconditional and the exporter is opt-in.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder with an HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_session_alive(alive: bool) {
    ::metrics::gauge!("wallet_rpc_session_alive").set(if alive { 1.0 } else { 0.0 });
}

pub fn record_reconnect(success: bool) {
    let result = if success { "success" } else { "failure" };
    ::metrics::counter!("wallet_reconnects_total", "result" => result).increment(1);
}

pub fn record_transfer(outcome: &'static str) {
    ::metrics::counter!("wallet_transfers_total", "outcome" => outcome).increment(1);
}

pub fn record_gas_fallback() {
    ::metrics::counter!("wallet_gas_fallback_total").increment(1);
}
