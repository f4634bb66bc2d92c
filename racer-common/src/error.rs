//! Common error types for racer

use thiserror::Error;

/// Common result type for racer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across racer microservices
#[derive(Error, Debug)]
pub enum Error {
    /// Payload could not be decoded into an `Answer`
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Buffer was closed for shutdown before the item could be enqueued
    #[error("Buffer closed: {0}")]
    BufferClosed(String),

    /// Relay to a downstream service failed
    #[error("Relay error: {0}")]
    Relay(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
