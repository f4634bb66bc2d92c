//! # Racer Common Library
//!
//! Shared code for the racer microservices:
//! - The `Answer` contract exchanged between every stage
//! - Wire types for acknowledgments and race status
//! - Bounded buffers with an explicit full-buffer policy
//! - The write-once race outcome
//! - Race events, the event bus and SSE streaming
//! - Configuration resolution and logging setup

pub mod answer;
pub mod api;
pub mod buffer;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod outcome;
pub mod shutdown;
pub mod sse;

pub use answer::Answer;
pub use buffer::{BoundedBuffer, BufferReceiver, OnFull, PushOutcome};
pub use error::{Error, Result};
pub use events::{EventBus, RaceEvent};
pub use outcome::{RaceOutcome, RaceStatus, SubmitAck};
