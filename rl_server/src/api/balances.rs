//! Balance and withdrawal API handlers.
//!
//! # Examples
//!
//! ```bash
//! curl http://localhost:8080/balance/alice
//! curl -X POST http://localhost:8080/withdraw \
//!   -H "Content-Type: application/json" \
//!   -d '{"userId": "alice", "amount": "1.25"}'
//! ```

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use recording_ledger::money;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, ErrorResponse, bad_request, with_ledger};
use crate::metrics;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WithdrawRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Decimal dollar amount, e.g. `"3.25"`
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub userid: String,
    /// Two-decimal dollar string
    pub balance: String,
}

/// Get a user's balance.
///
/// Unknown users are created with a zero balance.
///
/// # Response
///
/// Returns `200 OK`:
/// ```json
/// { "userid": "alice", "balance": "1.50" }
/// ```
pub async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let lookup_id = user_id.clone();
    let balance = with_ledger(&state, move |ledger| ledger.balance(&lookup_id)).await?;

    Ok(Json(BalanceResponse {
        userid: user_id,
        balance: money::format_cents(balance),
    }))
}

/// `GET /balance/` without a user ID
pub async fn missing_user_id() -> ApiError {
    bad_request("missing userId")
}

/// Withdraw from a user's balance.
///
/// # Response
///
/// Returns `200 OK` with the new balance:
/// ```json
/// { "userid": "alice", "balance": "0.25" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed JSON, missing `userId`, malformed or
///   non-positive `amount`
/// - `400 Bad Request` with `balance`: amount exceeds the balance, e.g.
///   `{"error": "insufficient balance", "balance": "0.25"}`
pub async fn withdraw(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BalanceResponse>, ApiError> {
    let request: WithdrawRequest =
        serde_json::from_slice(&body).map_err(|_| bad_request("invalid request"))?;
    if request.user_id.is_empty() {
        return Err(bad_request("missing userId"));
    }
    let amount = money::parse_cents(&request.amount).map_err(|_| bad_request("invalid amount"))?;

    let user_id = request.user_id.clone();
    let result = with_ledger(&state, move |ledger| ledger.withdraw(&user_id, amount)).await?;
    metrics::withdrawals_total(result.is_ok());

    match result {
        Ok(balance) => Ok(Json(BalanceResponse {
            userid: request.user_id,
            balance: money::format_cents(balance),
        })),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.client_message(),
                balance: e.available_balance().map(money::format_cents),
            }),
        )),
    }
}
