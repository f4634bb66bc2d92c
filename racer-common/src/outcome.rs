//! Race outcome and the status/acknowledgment wire types
//!
//! The outcome is write-once: the winner goes from empty to set exactly once
//! and is never reset or overwritten for the lifetime of the process.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::Answer;

/// Status message while no correct answer has been decided
pub const MSG_WAITING: &str = "Waiting for correct answer...";

/// Status message once a winner is recorded
pub const MSG_HAS_WINNER: &str = "Game has a winner";

const STATUS_OK: &str = "ok";

/// Snapshot of the race returned by the decision engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceStatus {
    pub status: String,
    /// Winning participant, `null` on the wire until decided
    pub winner: Option<i64>,
    pub message: String,
}

impl RaceStatus {
    pub fn waiting() -> Self {
        Self {
            status: STATUS_OK.to_string(),
            winner: None,
            message: MSG_WAITING.to_string(),
        }
    }

    pub fn decided(participant_id: i64) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            winner: Some(participant_id),
            message: MSG_HAS_WINNER.to_string(),
        }
    }
}

/// Acknowledgment returned by the intake once an answer is buffered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub status: String,
    pub msg: String,
}

impl SubmitAck {
    pub fn received(participant_id: i64) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            msg: format!("Received response from user {}", participant_id),
        }
    }
}

/// Write-once winner record guarded by a mutex
///
/// Exactly one task (the decision worker) calls [`RaceOutcome::observe`];
/// the lock exists so request handlers can read a consistent snapshot.
#[derive(Debug, Default)]
pub struct RaceOutcome {
    winner: Mutex<Option<Answer>>,
}

impl RaceOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `answer` as the winner if none exists yet and it is correct
    ///
    /// Returns true only for the single call that sets the winner.
    pub async fn observe(&self, answer: &Answer) -> bool {
        let mut winner = self.winner.lock().await;
        if winner.is_none() && answer.is_yes() {
            *winner = Some(answer.clone());
            true
        } else {
            false
        }
    }

    pub async fn winner(&self) -> Option<Answer> {
        self.winner.lock().await.clone()
    }

    pub async fn status(&self) -> RaceStatus {
        match self.winner.lock().await.as_ref() {
            Some(answer) => RaceStatus::decided(answer.participant_id),
            None => RaceStatus::waiting(),
        }
    }
}
