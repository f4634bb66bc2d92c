//! Relay of buffered answers to the decision engine
//!
//! Delivery is at-most-once and best-effort: a failed relay is logged and the
//! answer is gone. Retrying would shift answers later in the decision
//! buffer's FIFO order and so change who wins.

use std::time::Duration;

use async_trait::async_trait;
use racer_common::{Answer, Error, Result};
use tracing::{error, info};

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// What became of one dequeued answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Delivered to the decision engine
    Relayed,
    /// Discarded without a delivery attempt (shutdown)
    Dropped,
    /// Delivery attempted and failed; not retried
    Failed,
}

/// Transport to the next pipeline stage
#[async_trait]
pub trait Relay: Send + Sync {
    /// Where answers are sent, for logging
    fn target(&self) -> &str;

    /// Deliver one answer
    async fn relay(&self, answer: &Answer) -> Result<()>;
}

/// Relay over HTTP: JSON POST to the decision engine's ingestion endpoint
pub struct HttpRelay {
    http_client: reqwest::Client,
    url: String,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|e| Error::Relay(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Relay for HttpRelay {
    fn target(&self) -> &str {
        &self.url
    }

    async fn relay(&self, answer: &Answer) -> Result<()> {
        let response = self
            .http_client
            .post(&self.url)
            .json(answer)
            .send()
            .await
            .map_err(|e| Error::Relay(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Relay(format!("HTTP {}", status)))
        }
    }
}

/// Deliver one answer and classify the result
pub async fn forward_one(relay: &dyn Relay, answer: &Answer) -> RelayOutcome {
    match relay.relay(answer).await {
        Ok(()) => {
            info!(
                "Forwarded participant {} answer to {}",
                answer.participant_id,
                relay.target()
            );
            RelayOutcome::Relayed
        }
        Err(e) => {
            error!(
                "Error forwarding participant {} to {}: {}",
                answer.participant_id,
                relay.target(),
                e
            );
            RelayOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    #[async_trait]
    impl Relay for Refusing {
        fn target(&self) -> &str {
            "nowhere"
        }

        async fn relay(&self, _answer: &Answer) -> Result<()> {
            Err(Error::Relay("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_relay_is_classified() {
        let outcome = forward_one(&Refusing, &Answer::new(1, "yes", 10)).await;
        assert_eq!(outcome, RelayOutcome::Failed);
    }

    #[tokio::test]
    async fn test_http_relay_to_closed_port_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let relay = HttpRelay::new(format!("http://{}/game/response", addr)).unwrap();
        let outcome = forward_one(&relay, &Answer::new(2, "no", 10)).await;
        assert_eq!(outcome, RelayOutcome::Failed);
    }
}
