//! Prometheus metrics for monitoring ledger server health and activity.
//!
//! Metrics are exposed in Prometheus text format on a separate listener when
//! `METRICS_BIND` is configured. Without an installed exporter every
//! recording call below is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and durations
//! - **Ledger Metrics**: Recordings credited, fraud flags, cents paid, withdrawals
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use rl_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/recording/end", 200);
//! metrics::fraud_flags_total(2);
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
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Increment processed recordings counter (one per end-recording call).
pub fn recordings_processed_total() {
    metrics::counter!("recordings_processed_total").increment(1);
}

/// Add participants credited with a good recording.
pub fn participants_credited_total(count: usize) {
    metrics::counter!("participants_credited_total").increment(count as u64);
}

/// Add participants flagged as fraudulent.
pub fn fraud_flags_total(count: usize) {
    metrics::counter!("fraud_flags_total").increment(count as u64);
}

/// Add cents paid out by credits.
pub fn cents_credited_total(cents: i64) {
    metrics::counter!("cents_credited_total").increment(cents.max(0).unsigned_abs());
}

/// Increment withdrawals counter.
pub fn withdrawals_total(success: bool) {
    metrics::counter!("withdrawals_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Set current known user count.
pub fn known_users(count: usize) {
    metrics::gauge!("known_users").set(count as f64);
}
