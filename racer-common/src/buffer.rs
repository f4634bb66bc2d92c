//! Bounded FIFO buffers between request handlers and worker pools
//!
//! Both pipeline stages hand answers to their workers through the same buffer
//! type; only the full-buffer policy differs:
//! - [`OnFull::Block`]: the producer waits (without timeout) until space frees.
//! - [`OnFull::DropAndWarn`]: the producer never waits; the item is discarded,
//!   counted, and a warning is logged.
//!
//! Shutdown is close-and-drain: after [`BoundedBuffer::close`] new pushes fail,
//! producers parked on a full `Block` buffer are released with an error, and
//! receivers keep yielding already-buffered items until the buffer is empty.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{Error, Result};

/// What a producer experiences when the buffer is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFull {
    /// Wait until a worker frees a slot
    Block,
    /// Discard the item and record the drop
    DropAndWarn,
}

impl fmt::Display for OnFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnFull::Block => write!(f, "block"),
            OnFull::DropAndWarn => write!(f, "drop-and-warn"),
        }
    }
}

/// Result of a successful push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Item is queued for a worker
    Enqueued,
    /// Buffer was full and the policy discarded the item
    Dropped,
}

/// Fixed-capacity FIFO hand-off from producers to a pool of workers
pub struct BoundedBuffer<T> {
    name: String,
    capacity: usize,
    on_full: OnFull,
    tx: mpsc::Sender<T>,
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
    closed: CancellationToken,
    dropped: AtomicU64,
}

impl<T: Send> BoundedBuffer<T> {
    /// Create a buffer. A capacity of zero is treated as one.
    pub fn new(name: impl Into<String>, capacity: usize, on_full: OnFull) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            name: name.into(),
            capacity,
            on_full,
            tx,
            rx: Arc::new(Mutex::new(rx)),
            closed: CancellationToken::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue an item according to the buffer's full-buffer policy
    ///
    /// Fails only once the buffer has been closed.
    pub async fn push(&self, item: T) -> Result<PushOutcome> {
        if self.closed.is_cancelled() {
            return Err(self.closed_error());
        }

        match self.on_full {
            OnFull::Block => {
                tokio::select! {
                    biased;
                    _ = self.closed.cancelled() => Err(self.closed_error()),
                    sent = self.tx.send(item) => sent
                        .map(|_| PushOutcome::Enqueued)
                        .map_err(|_| self.closed_error()),
                }
            }
            OnFull::DropAndWarn => match self.tx.try_send(item) {
                Ok(()) => Ok(PushOutcome::Enqueued),
                Err(TrySendError::Full(_)) => {
                    let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    warn!(
                        buffer = %self.name,
                        capacity = self.capacity,
                        dropped,
                        "Buffer full, dropping item"
                    );
                    Ok(PushOutcome::Dropped)
                }
                Err(TrySendError::Closed(_)) => Err(self.closed_error()),
            },
        }
    }

    /// Handle for workers; every clone pulls from the same FIFO
    pub fn receiver(&self) -> BufferReceiver<T> {
        BufferReceiver {
            rx: Arc::clone(&self.rx),
            closed: self.closed.clone(),
        }
    }

    /// Stop accepting items and let receivers drain what is already queued
    pub fn close(&self) {
        if !self.closed.is_cancelled() {
            debug!(buffer = %self.name, queued = self.len(), "Closing buffer");
            self.closed.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of items currently queued
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn on_full(&self) -> OnFull {
        self.on_full
    }

    /// Items discarded by the `DropAndWarn` policy since creation
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn closed_error(&self) -> Error {
        Error::BufferClosed(self.name.clone())
    }
}

/// Consumer side of a [`BoundedBuffer`]
pub struct BufferReceiver<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
    closed: CancellationToken,
}

impl<T> Clone for BufferReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
            closed: self.closed.clone(),
        }
    }
}

impl<T: Send> BufferReceiver<T> {
    /// Next item in FIFO order
    ///
    /// Waits while the buffer is open and empty. Returns `None` once the buffer
    /// is closed and fully drained.
    pub async fn recv(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;
        tokio::select! {
            biased;
            item = rx.recv() => item,
            _ = self.closed.cancelled() => rx.try_recv().ok(),
        }
    }

    /// Take everything still queued without waiting
    pub async fn drain(&self) -> Vec<T> {
        let mut rx = self.rx.lock().await;
        let mut items = Vec::new();
        while let Ok(item) = rx.try_recv() {
            items.push(item);
        }
        items
    }
}
