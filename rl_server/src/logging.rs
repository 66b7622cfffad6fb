//! Structured logging configuration.
//!
//! This module provides structured logging with request correlation and
//! fraud event tracking.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,tower_http=warn";

/// Initialize structured logging
///
/// Features:
/// - Request ID correlation
/// - Ledger library `log` records forwarded into `tracing`
/// - Configurable log levels via RUST_LOG env var
///
/// # Example
///
/// ```no_run
/// use rl_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a recording that flagged one or more participants as fraudulent
///
/// # Arguments
///
/// * `recording_id` - Recording that triggered the flag
/// * `fraud_users` - Participants whose history it overlapped
///
/// # Example
///
/// ```
/// use rl_server::logging::log_fraud_event;
///
/// log_fraud_event("rec-42", &["alice".to_string()]);
/// ```
pub fn log_fraud_event<S: AsRef<str>>(recording_id: &str, fraud_users: &[S]) {
    if fraud_users.is_empty() {
        return;
    }
    let users: Vec<&str> = fraud_users.iter().map(|u| u.as_ref()).collect();
    tracing::warn!(
        recording_id = recording_id,
        fraud_count = users.len(),
        users = ?users,
        "FRAUD: overlapping recording reversed participant credits"
    );
}

/// Log API request/response
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path` - Request path
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
///
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow request"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}
