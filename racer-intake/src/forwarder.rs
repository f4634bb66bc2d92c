//! Intake forwarder
//!
//! Decouples bursty answer arrival from relay latency: `submit` blocks only
//! while the intake buffer is full, and a fixed pool of workers drains the
//! buffer and relays each answer downstream.
//!
//! With several workers sharing one buffer, relay order across workers is not
//! enqueue order. Each worker relays in the order it dequeues.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use racer_common::config::{DEFAULT_INTAKE_CAPACITY, DEFAULT_INTAKE_WORKERS};
use racer_common::{Answer, BoundedBuffer, BufferReceiver, OnFull, Result, SubmitAck};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::relay::{forward_one, Relay, RelayOutcome};

/// Buffer and pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub capacity: usize,
    pub workers: usize,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INTAKE_CAPACITY,
            workers: DEFAULT_INTAKE_WORKERS,
        }
    }
}

/// Counters exposed for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntakeStats {
    /// Answers accepted into the intake buffer
    pub submitted: u64,
    pub relayed: u64,
    pub failed: u64,
    pub dropped: u64,
    /// Answers waiting for a worker
    pub queued: usize,
    pub capacity: usize,
    pub workers: usize,
}

#[derive(Debug, Default)]
struct RelayCounters {
    relayed: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl RelayCounters {
    fn record(&self, outcome: RelayOutcome) {
        let counter = match outcome {
            RelayOutcome::Relayed => &self.relayed,
            RelayOutcome::Failed => &self.failed,
            RelayOutcome::Dropped => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Blocking intake buffer plus its forwarding worker pool
pub struct Forwarder {
    buffer: BoundedBuffer<Answer>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    submitted: AtomicU64,
    counters: Arc<RelayCounters>,
}

impl Forwarder {
    /// Create the intake buffer and spawn the worker pool
    ///
    /// Must be called from within a Tokio runtime. A worker count of zero is
    /// treated as one.
    pub fn start(config: ForwarderConfig, relay: Arc<dyn Relay>) -> Self {
        let buffer = BoundedBuffer::new("intake", config.capacity, OnFull::Block);
        let counters = Arc::new(RelayCounters::default());
        let worker_count = config.workers.max(1);

        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(forward_loop(
                    worker_id,
                    buffer.receiver(),
                    Arc::clone(&relay),
                    Arc::clone(&counters),
                ))
            })
            .collect();

        info!(
            "Forwarder started with {} workers (buffer capacity {}, relaying to {})",
            worker_count,
            buffer.capacity(),
            relay.target()
        );

        Self {
            buffer,
            workers: Mutex::new(workers),
            worker_count,
            submitted: AtomicU64::new(0),
            counters,
        }
    }

    /// Buffer an answer for relay
    ///
    /// Waits, without timeout, while the intake buffer is full. Returns as soon
    /// as the answer is buffered; the relay happens later. Fails only after
    /// shutdown has begun.
    pub async fn submit(&self, answer: Answer) -> Result<SubmitAck> {
        let participant_id = answer.participant_id;
        self.buffer.push(answer).await?;
        self.submitted.fetch_add(1, Ordering::Relaxed);
        debug!("Buffered answer from participant {}", participant_id);
        Ok(SubmitAck::received(participant_id))
    }

    pub fn stats(&self) -> IntakeStats {
        IntakeStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            relayed: self.counters.relayed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            queued: self.buffer.len(),
            capacity: self.buffer.capacity(),
            workers: self.worker_count,
        }
    }

    /// Stop accepting answers, relay everything already buffered, then join
    /// the workers
    pub async fn shutdown(&self) {
        let workers = std::mem::take(&mut *self.workers.lock().await);
        if workers.is_empty() {
            return;
        }

        info!("Forwarder draining {} buffered answers", self.buffer.len());
        self.buffer.close();

        for worker in workers {
            if let Err(e) = worker.await {
                warn!("Forwarding worker ended abnormally: {}", e);
            }
        }

        for answer in self.buffer.receiver().drain().await {
            warn!(
                "Dropping participant {} answer buffered during shutdown",
                answer.participant_id
            );
            self.counters.record(RelayOutcome::Dropped);
        }

        info!("Forwarder stopped ({:?})", self.stats());
    }
}

async fn forward_loop(
    worker_id: usize,
    rx: BufferReceiver<Answer>,
    relay: Arc<dyn Relay>,
    counters: Arc<RelayCounters>,
) {
    debug!("Forwarding worker {} started", worker_id);

    while let Some(answer) = rx.recv().await {
        let outcome = forward_one(relay.as_ref(), &answer).await;
        counters.record(outcome);
    }

    debug!("Forwarding worker {} stopped", worker_id);
}
