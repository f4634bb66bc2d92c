//! Race events and the broadcast bus that carries them
//!
//! The decision engine emits events as answers flow through it; SSE clients
//! and tests subscribe. Emission never fails the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Race event types
///
/// Serialized with a `type` tag for SSE transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RaceEvent {
    /// Answer was queued for the decision worker
    AnswerAccepted {
        participant_id: i64,
        value: String,
        timestamp: DateTime<Utc>,
    },

    /// Decision buffer was full and the answer was discarded
    AnswerDropped {
        participant_id: i64,
        timestamp: DateTime<Utc>,
    },

    /// First correct answer recorded; emitted exactly once per process
    WinnerDeclared {
        participant_id: i64,
        claimed_delay_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl RaceEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            RaceEvent::AnswerAccepted { .. } => "AnswerAccepted",
            RaceEvent::AnswerDropped { .. } => "AnswerDropped",
            RaceEvent::WinnerDeclared { .. } => "WinnerDeclared",
        }
    }

    pub fn participant_id(&self) -> i64 {
        match self {
            RaceEvent::AnswerAccepted { participant_id, .. }
            | RaceEvent::AnswerDropped { participant_id, .. }
            | RaceEvent::WinnerDeclared { participant_id, .. } => *participant_id,
        }
    }
}

/// Broadcast bus for [`RaceEvent`]s
///
/// Slow subscribers lag and lose the oldest events; publishers never wait.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RaceEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<RaceEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the case where nobody is listening
    pub fn emit(&self, event: RaceEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
