//! racer-intake (Intake/Forwarder) - Main entry point
//!
//! Accepts participant answers and relays them to the decision engine.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use racer_common::logging::init_tracing;
use racer_common::shutdown::shutdown_signal;
use racer_intake::config::Args;
use racer_intake::{build_router, AppState, Forwarder, HttpRelay};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("racer_intake=info,racer_common=info,tower_http=info");

    info!(
        "Starting racer Intake (racer-intake) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = Args::parse()
        .resolve()
        .context("Invalid configuration")?;

    let relay = HttpRelay::new(config.downstream_url.clone())
        .context("Failed to create HTTP relay client")?;
    let forwarder = Arc::new(Forwarder::start(config.forwarder, Arc::new(relay)));
    let app = build_router(AppState::new(Arc::clone(&forwarder)));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    info!("racer-intake listening on http://{}", config.listen_addr);
    info!("POST answers to http://{}/submit", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    forwarder.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}
