//! Prometheus metrics for monitoring the duel server.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! when `METRICS_BIND` is set.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use wd_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::websocket_connection_opened();
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Record a new WebSocket connection.
pub fn websocket_connection_opened() {
    metrics::counter!("websocket_connections_total").increment(1);
    metrics::gauge!("websocket_connections_active").increment(1.0);
}

/// Record a closed WebSocket connection.
pub fn websocket_connection_closed() {
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

// ============================================================================
// Match Metrics
// ============================================================================

/// Increment the counter of connections turned away from a full match.
pub fn joins_rejected_total() {
    metrics::counter!("joins_rejected_total").increment(1);
}

/// Record a submitted wager.
pub fn wagers_submitted_total(accepted: bool) {
    metrics::counter!("wagers_submitted_total",
        "accepted" => accepted.to_string()
    )
    .increment(1);
}
