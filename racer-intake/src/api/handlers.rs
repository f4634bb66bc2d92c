//! Intake request handlers

use axum::{body::Bytes, extract::State, Json};
use racer_common::api::{decode_answer, ApiError};
use racer_common::SubmitAck;
use tracing::warn;

use crate::{AppState, IntakeStats};

/// POST /submit
///
/// Buffers the answer for relay, waiting while the intake buffer is full.
/// The acknowledgment does not mean the answer reached the decision engine.
pub async fn submit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitAck>, ApiError> {
    let answer = decode_answer(&body)?;
    state.forwarder.submit(answer).await.map(Json).map_err(|e| {
        warn!("Rejecting submission: {}", e);
        ApiError::ShuttingDown
    })
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> Json<IntakeStats> {
    Json(state.forwarder.stats())
}

/// GET /
pub async fn banner() -> &'static str {
    "Intake Server Running. POST to /submit\n"
}
