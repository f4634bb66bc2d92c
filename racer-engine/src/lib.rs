//! racer-engine library - Decision Engine service
//!
//! Accepts relayed answers, serializes winner determination through one
//! worker, and reports the race status to every caller.

use std::sync::Arc;

use axum::Router;
use racer_common::EventBus;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod engine;

pub use engine::{DecisionEngine, EngineStats};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
}

impl AppState {
    pub fn new(engine: Arc<DecisionEngine>) -> Self {
        Self { engine }
    }

    pub fn events(&self) -> &EventBus {
        self.engine.events()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use racer_common::api::only_post;

    Router::new()
        .route("/", get(api::home))
        .route(
            "/game/response",
            post(api::submit_response).fallback(only_post),
        )
        .route("/game/status", get(api::get_status))
        .route("/stats", get(api::get_stats))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
