//! HTTP API handlers for racer-engine

pub mod handlers;
pub mod health;

pub use handlers::{event_stream, get_stats, get_status, home, submit_response};
pub use health::health_routes;
