//! Recording API handlers.
//!
//! # Examples
//!
//! End a recording:
//! ```bash
//! curl -X POST http://localhost:8080/recording/end \
//!   -H "Content-Type: application/json" \
//!   -d '{"recordingId": "rec-1", "start": "2023-01-01T10:00:00Z",
//!        "end": "2023-01-01T11:30:00Z", "participants": ["alice", "bob"]}'
//! ```

use axum::{Json, body::Bytes, extract::State};
use chrono::{DateTime, Utc};
use recording_ledger::money::Cents;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ApiError, AppState, bad_request, request_id::RequestId, with_ledger};
use crate::{logging, metrics};

/// Body of an end-recording request. Missing fields default to empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndRecordingRequest {
    pub recording_id: String,
    pub start: String,
    pub end: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EndRecordingResponse {
    /// Cents credited per participant (0 for fraud)
    pub credited: BTreeMap<String, Cents>,
    /// Participants flagged by this recording, sorted
    #[serde(rename = "fraudUsers")]
    pub fraud_users: Vec<String>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Credit a finished recording to its participants.
///
/// # Response
///
/// Returns `200 OK`:
/// ```json
/// { "credited": { "alice": 150, "bob": 0 }, "fraudUsers": ["bob"] }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed JSON, unparsable `start`/`end`, empty
///   recording ID, `end` not after `start`, or no usable participants
pub async fn end_recording(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Bytes,
) -> Result<Json<EndRecordingResponse>, ApiError> {
    let request: EndRecordingRequest =
        serde_json::from_slice(&body).map_err(|_| bad_request("invalid request"))?;

    let start = parse_timestamp(&request.start).ok_or_else(|| bad_request("invalid start time"))?;
    let end = parse_timestamp(&request.end).ok_or_else(|| bad_request("invalid end time"))?;

    let recording_id = request.recording_id.clone();
    let participants = request.participants;
    let outcome = with_ledger(&state, move |ledger| {
        ledger.credit_recording(&recording_id, start, end, &participants)
    })
    .await?
    .map_err(|e| {
        tracing::info!(request_id = %request_id.as_str(), "End recording rejected: {e}");
        bad_request(e.client_message())
    })?;

    let fraud_users: Vec<String> = outcome.fraud_users.into_iter().collect();
    let good = outcome.credited.len() - fraud_users.len();

    metrics::recordings_processed_total();
    metrics::participants_credited_total(good);
    metrics::fraud_flags_total(fraud_users.len());
    metrics::cents_credited_total(outcome.credited.values().sum());
    logging::log_fraud_event(&request.recording_id, fraud_users.as_slice());

    tracing::debug!(
        request_id = %request_id.as_str(),
        recording_id = %request.recording_id,
        participants = outcome.credited.len(),
        "Recording credited"
    );

    Ok(Json(EndRecordingResponse {
        credited: outcome.credited,
        fraud_users,
    }))
}
