//! HTTP API for the recording ledger server.
//!
//! # Modules
//!
//! - [`recordings`]: End a recording and credit its participants
//! - [`balances`]: Balance queries and withdrawals
//! - [`request_id`]: Request correlation, request logging and HTTP metrics
//!
//! # Endpoints Overview
//!
//! - `POST /recording/end` - Credit a finished recording
//! - `GET /balance/{user_id}` - Current balance as a two-decimal string
//! - `POST /withdraw` - Withdraw a decimal amount
//! - `GET /health` - Server health status
//!
//! Every ledger route is served both at the root and under `/api/v1`.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use rl_server::api::{create_router, AppState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_router(AppState::new());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Caller errors are answered with `400 Bad Request` and a JSON body
//! `{"error": "..."}`. A rejected withdrawal also carries the unchanged
//! `"balance"`.

pub mod balances;
pub mod recordings;
pub mod request_id;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use recording_ledger::LedgerManager;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::metrics;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to the Arc wrapper).
#[derive(Clone, Default)]
pub struct AppState {
    pub ledger: Arc<LedgerManager>,
}

impl AppState {
    /// State over a fresh, empty ledger
    pub fn new() -> Self {
        Self::default()
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Unchanged balance, present when a withdrawal was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

/// Handler error: status plus JSON body
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// `400 Bad Request` with a message
pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            balance: None,
        }),
    )
}

/// Run a ledger operation on the blocking pool.
///
/// Ledger calls may wait on per-user locks, so they never run on the async
/// workers.
pub(crate) async fn with_ledger<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&LedgerManager) -> T + Send + 'static,
    T: Send + 'static,
{
    let ledger = Arc::clone(&state.ledger);
    tokio::task::spawn_blocking(move || op(&ledger))
        .await
        .map_err(|e| {
            tracing::error!("Ledger task failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal server error".to_string(),
                    balance: None,
                }),
            )
        })
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health                         - Health check
/// POST /api/v1/recording/end           - Credit a finished recording
/// GET  /api/v1/balance/{user_id}       - Balance
/// POST /api/v1/withdraw                - Withdraw
/// ```
///
/// The same ledger routes are also mounted without the `/api/v1` prefix.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(ledger_routes())
        .nest("/api/v1", ledger_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id::request_id_middleware))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Ledger routes, mounted at the root and under `/api/v1`
fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/recording/end", post(recordings::end_recording))
        .route("/balance/", get(balances::missing_user_id))
        .route("/balance/{user_id}", get(balances::get_balance))
        .route("/withdraw", post(balances::withdraw))
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0","users":3,"timestamp":"2025-11-22T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let users = state.ledger.store().len();
    metrics::known_users(users);

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "users": users,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
