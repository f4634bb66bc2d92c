//! HTTP API handlers for racer-intake

pub mod handlers;
pub mod health;

pub use handlers::{banner, get_stats, submit};
pub use health::health_routes;
