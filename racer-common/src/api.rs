//! HTTP boundary types shared by the racer services
//!
//! Rejections are plain-text bodies with a 4xx/5xx status. Validation
//! happens here, before anything reaches a buffer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::Answer;

/// Boundary errors surfaced to HTTP callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Ingestion endpoints only accept POST (405)
    #[error("Only POST allowed")]
    MethodNotAllowed,

    /// Body was not a decodable answer (400)
    #[error("Invalid JSON")]
    InvalidJson,

    /// Service is draining for shutdown (503)
    #[error("Service shutting down")]
    ShuttingDown,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, self.to_string()).into_response()
    }
}

/// Decode a request body into an answer, rejecting malformed payloads
pub fn decode_answer(body: &[u8]) -> Result<Answer, ApiError> {
    Answer::decode(body).map_err(|e| {
        debug!("Rejecting undecodable answer: {}", e);
        ApiError::InvalidJson
    })
}

/// Method fallback for POST-only routes
pub async fn only_post() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok(module: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            module: module.to_string(),
            version: version.to_string(),
        }
    }
}
