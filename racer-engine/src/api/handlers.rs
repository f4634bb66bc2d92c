//! Decision engine request handlers

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::State,
    response::{sse::Event, Html, Sse},
    Json,
};
use futures::stream::Stream;
use racer_common::api::{decode_answer, ApiError};
use racer_common::RaceStatus;

use crate::{AppState, EngineStats};

/// POST /game/response
///
/// Offers a relayed answer to the decision buffer (drop-on-full) and replies
/// with the race status at the time of the call.
pub async fn submit_response(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RaceStatus>, ApiError> {
    let answer = decode_answer(&body)?;
    Ok(Json(state.engine.accept(answer).await))
}

/// GET /game/status
pub async fn get_status(State(state): State<AppState>) -> Json<RaceStatus> {
    Json(state.engine.status().await)
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.stats())
}

/// GET /events - SSE stream of race events
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    racer_common::sse::create_event_sse_stream("racer-engine", state.events())
}

/// GET /
pub async fn home() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Decision Engine</title>
</head>
<body style="font-family:sans-serif;text-align:center;margin-top:50px;">
    <h1>Decision Engine Running</h1>
    <p>POST answers to <code>/game/response</code></p>
    <p>The first participant who answers <b>yes</b> wins!</p>
</body>
</html>
"#,
    )
}
