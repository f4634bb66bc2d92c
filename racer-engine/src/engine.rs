//! Decision engine
//!
//! Accepts relayed answers into a drop-on-full buffer and runs a single
//! decision worker that records the first "yes" it dequeues as the winner.
//!
//! "First" means first in decision-buffer FIFO order. Claimed delays and
//! arrival times at the HTTP boundary play no part: the single worker is the
//! only writer of the outcome, so its dequeue order is the race order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use racer_common::config::DEFAULT_DECISION_CAPACITY;
use racer_common::{
    Answer, BoundedBuffer, BufferReceiver, EventBus, OnFull, PushOutcome, RaceEvent,
    RaceOutcome, RaceStatus,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counters exposed for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Calls to `accept`
    pub received: u64,
    /// Answers discarded because the decision buffer was full
    pub dropped: u64,
    /// Answers the decision worker has evaluated
    pub processed: u64,
    /// Answers waiting in the decision buffer
    pub queued: usize,
    pub capacity: usize,
}

/// Single-consumer winner determination
pub struct DecisionEngine {
    buffer: BoundedBuffer<Answer>,
    outcome: Arc<RaceOutcome>,
    events: EventBus,
    received: AtomicU64,
    processed: Arc<AtomicU64>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DecisionEngine {
    /// Create the engine and spawn its decision worker
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(capacity: usize, events: EventBus) -> Self {
        let buffer = BoundedBuffer::new("decision", capacity, OnFull::DropAndWarn);
        let outcome = Arc::new(RaceOutcome::new());
        let processed = Arc::new(AtomicU64::new(0));

        let worker = tokio::spawn(decision_loop(
            buffer.receiver(),
            Arc::clone(&outcome),
            events.clone(),
            Arc::clone(&processed),
        ));

        info!(
            "Decision engine started (buffer capacity {}, policy {})",
            buffer.capacity(),
            buffer.on_full()
        );

        Self {
            buffer,
            outcome,
            events,
            received: AtomicU64::new(0),
            processed,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Engine with the standard decision buffer capacity
    pub fn with_defaults(events: EventBus) -> Self {
        Self::start(DEFAULT_DECISION_CAPACITY, events)
    }

    /// Offer an answer to the decision worker and report the race state
    ///
    /// Never waits for buffer space: a full buffer drops the answer. The
    /// returned status is read at call time and need not reflect `answer`.
    pub async fn accept(&self, answer: Answer) -> RaceStatus {
        self.received.fetch_add(1, Ordering::Relaxed);
        let participant_id = answer.participant_id;
        let value = answer.value.clone();

        match self.buffer.push(answer).await {
            Ok(PushOutcome::Enqueued) => {
                debug!("Queued answer from participant {}", participant_id);
                self.events.emit(RaceEvent::AnswerAccepted {
                    participant_id,
                    value,
                    timestamp: Utc::now(),
                });
            }
            Ok(PushOutcome::Dropped) => {
                self.events.emit(RaceEvent::AnswerDropped {
                    participant_id,
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                warn!(
                    "Answer from participant {} not queued: {}",
                    participant_id, e
                );
                self.events.emit(RaceEvent::AnswerDropped {
                    participant_id,
                    timestamp: Utc::now(),
                });
            }
        }

        self.outcome.status().await
    }

    /// Current race state without submitting anything
    pub async fn status(&self) -> RaceStatus {
        self.outcome.status().await
    }

    pub async fn winner(&self) -> Option<Answer> {
        self.outcome.winner().await
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            received: self.received.load(Ordering::Relaxed),
            dropped: self.buffer.dropped(),
            processed: self.processed.load(Ordering::Relaxed),
            queued: self.buffer.len(),
            capacity: self.buffer.capacity(),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Close the decision buffer, let the worker drain it, and wait for it
    ///
    /// Later `accept` calls still answer with the race status but queue nothing.
    pub async fn shutdown(&self) {
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };

        info!("Decision engine draining {} queued answers", self.buffer.len());
        self.buffer.close();

        if let Err(e) = worker.await {
            warn!("Decision worker ended abnormally: {}", e);
        }

        let leftover = self.buffer.receiver().drain().await;
        if !leftover.is_empty() {
            warn!(
                "{} answers arrived during shutdown and were not evaluated",
                leftover.len()
            );
        }

        info!("Decision engine stopped ({:?})", self.stats());
    }
}

/// The only writer of the race outcome
async fn decision_loop(
    rx: BufferReceiver<Answer>,
    outcome: Arc<RaceOutcome>,
    events: EventBus,
    processed: Arc<AtomicU64>,
) {
    debug!("Decision worker started");

    while let Some(answer) = rx.recv().await {
        if outcome.observe(&answer).await {
            info!(
                "🏆 Winner is participant {} (claimed delay: {}ms)",
                answer.participant_id, answer.claimed_delay_ms
            );
            events.emit(RaceEvent::WinnerDeclared {
                participant_id: answer.participant_id,
                claimed_delay_ms: answer.claimed_delay_ms,
                timestamp: Utc::now(),
            });
        }
        processed.fetch_add(1, Ordering::Relaxed);
    }

    debug!("Decision worker stopped");
}
