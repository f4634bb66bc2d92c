//! racer-intake library - Intake/Forwarder service
//!
//! Accepts answers from participants, buffers them with blocking
//! backpressure, and relays them to the decision engine.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod forwarder;
pub mod relay;

pub use forwarder::{Forwarder, ForwarderConfig, IntakeStats};
pub use relay::{HttpRelay, Relay, RelayOutcome};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

impl AppState {
    pub fn new(forwarder: Arc<Forwarder>) -> Self {
        Self { forwarder }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use racer_common::api::only_post;

    Router::new()
        .route("/", get(api::banner))
        .route("/submit", post(api::submit).fallback(only_post))
        .route("/stats", get(api::get_stats))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
