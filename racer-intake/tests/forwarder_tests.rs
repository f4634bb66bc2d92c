//! Forwarder behavior with in-process relays
//!
//! - Blocking backpressure when the intake buffer is full
//! - Every buffered answer relayed exactly once
//! - Failed relays are counted and never retried
//! - Close-and-drain shutdown

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use racer_common::{Answer, Error, Result};
use racer_intake::{Forwarder, ForwarderConfig, Relay};
use tokio::sync::{Mutex, Semaphore};
use tokio::time::timeout;

/// Records every answer it is asked to relay
#[derive(Default)]
struct RecordingRelay {
    relayed: Mutex<Vec<Answer>>,
}

#[async_trait]
impl Relay for RecordingRelay {
    fn target(&self) -> &str {
        "recording"
    }

    async fn relay(&self, answer: &Answer) -> Result<()> {
        self.relayed.lock().await.push(answer.clone());
        Ok(())
    }
}

/// Fails every attempt
#[derive(Default)]
struct FailingRelay {
    attempts: AtomicUsize,
}

#[async_trait]
impl Relay for FailingRelay {
    fn target(&self) -> &str {
        "failing"
    }

    async fn relay(&self, _answer: &Answer) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Relay("decision engine unreachable".to_string()))
    }
}

/// Holds every relay until the test releases a permit
struct GatedRelay {
    started: AtomicUsize,
    gate: Semaphore,
}

impl GatedRelay {
    fn new() -> Self {
        Self {
            started: AtomicUsize::new(0),
            gate: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl Relay for GatedRelay {
    fn target(&self) -> &str {
        "gated"
    }

    async fn relay(&self, _answer: &Answer) -> Result<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| Error::Relay(e.to_string()))?;
        permit.forget();
        Ok(())
    }
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_submit_acknowledges_before_relay() {
    let relay = Arc::new(GatedRelay::new());
    let forwarder = Forwarder::start(
        ForwarderConfig { capacity: 10, workers: 1 },
        relay.clone(),
    );

    let ack = forwarder.submit(Answer::new(3, "yes", 40)).await.unwrap();
    assert_eq!(ack.status, "ok");
    assert_eq!(ack.msg, "Received response from user 3");
    assert_eq!(forwarder.stats().relayed, 0);

    relay.gate.add_permits(1);
    forwarder.shutdown().await;
    assert_eq!(forwarder.stats().relayed, 1);
}

#[tokio::test]
async fn test_single_worker_relays_in_submission_order() {
    let relay = Arc::new(RecordingRelay::default());
    let forwarder = Forwarder::start(
        ForwarderConfig { capacity: 100, workers: 1 },
        relay.clone(),
    );

    for id in 0..20 {
        forwarder.submit(Answer::new(id, "no", 10)).await.unwrap();
    }
    forwarder.shutdown().await;

    let ids: Vec<i64> = relay.relayed.lock().await.iter().map(|a| a.participant_id).collect();
    assert_eq!(ids, (0..20).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_pool_relays_each_answer_once() {
    let relay = Arc::new(RecordingRelay::default());
    let forwarder = Arc::new(Forwarder::start(ForwarderConfig::default(), relay.clone()));

    let mut submitters = tokio::task::JoinSet::new();
    for id in 0..200 {
        let forwarder = Arc::clone(&forwarder);
        submitters.spawn(async move { forwarder.submit(Answer::new(id, "no", 1)).await });
    }
    while let Some(result) = submitters.join_next().await {
        result.unwrap().unwrap();
    }
    forwarder.shutdown().await;

    let mut ids: Vec<i64> = relay.relayed.lock().await.iter().map(|a| a.participant_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..200).collect::<Vec<_>>());

    let stats = forwarder.stats();
    assert_eq!(stats.submitted, 200);
    assert_eq!(stats.relayed, 200);
    assert_eq!(stats.workers, 5);
    assert_eq!(stats.capacity, 1000);
}

#[tokio::test]
async fn test_full_buffer_blocks_submit_until_space_frees() {
    let relay = Arc::new(GatedRelay::new());
    let forwarder = Arc::new(Forwarder::start(
        ForwarderConfig { capacity: 2, workers: 1 },
        relay.clone(),
    ));

    // The worker takes the first answer and parks inside the relay
    forwarder.submit(Answer::new(1, "no", 1)).await.unwrap();
    wait_for(|| relay.started.load(Ordering::SeqCst) == 1).await;

    // Two more fill the buffer
    forwarder.submit(Answer::new(2, "no", 1)).await.unwrap();
    forwarder.submit(Answer::new(3, "no", 1)).await.unwrap();
    assert_eq!(forwarder.stats().queued, 2);

    let blocked = {
        let forwarder = Arc::clone(&forwarder);
        tokio::spawn(async move { forwarder.submit(Answer::new(4, "yes", 1)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished(), "submit into a full intake buffer must wait");

    relay.gate.add_permits(10);
    let ack = timeout(Duration::from_secs(5), blocked)
        .await
        .expect("submit should complete once space frees")
        .unwrap()
        .unwrap();
    assert_eq!(ack.msg, "Received response from user 4");

    forwarder.shutdown().await;
    let stats = forwarder.stats();
    assert_eq!(stats.submitted, 4);
    assert_eq!(stats.relayed, 4);
    assert_eq!(stats.dropped, 0);
}

#[tokio::test]
async fn test_failed_relays_are_not_retried() {
    let relay = Arc::new(FailingRelay::default());
    let forwarder = Forwarder::start(
        ForwarderConfig { capacity: 10, workers: 2 },
        relay.clone(),
    );

    for id in 0..6 {
        forwarder.submit(Answer::new(id, "yes", 1)).await.unwrap();
    }
    forwarder.shutdown().await;

    assert_eq!(relay.attempts.load(Ordering::SeqCst), 6);
    let stats = forwarder.stats();
    assert_eq!(stats.failed, 6);
    assert_eq!(stats.relayed, 0);
}

#[tokio::test]
async fn test_submit_after_shutdown_fails() {
    let relay = Arc::new(RecordingRelay::default());
    let forwarder = Forwarder::start(ForwarderConfig { capacity: 4, workers: 1 }, relay);
    forwarder.shutdown().await;

    let result = forwarder.submit(Answer::new(1, "yes", 1)).await;
    assert!(matches!(result, Err(Error::BufferClosed(_))));
}
