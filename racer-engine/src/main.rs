//! racer-engine (Decision Engine) - Main entry point
//!
//! Receives answers relayed by the intake and records the first correct one.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use racer_common::logging::init_tracing;
use racer_common::shutdown::shutdown_signal;
use racer_common::EventBus;
use racer_engine::config::Args;
use racer_engine::{build_router, AppState, DecisionEngine};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("racer_engine=info,racer_common=info,tower_http=info");

    info!(
        "Starting racer Decision Engine (racer-engine) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = Args::parse()
        .resolve()
        .context("Invalid configuration")?;

    let events = EventBus::new(256);
    let engine = Arc::new(DecisionEngine::start(config.capacity, events));
    let app = build_router(AppState::new(Arc::clone(&engine)));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    info!("racer-engine listening on http://{}", config.listen_addr);
    info!("POST answers to http://{}/game/response", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    engine.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}
