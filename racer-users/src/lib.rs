//! racer-users - participant simulator
//!
//! Spawns N concurrent participants. Each waits a random delay, picks "yes"
//! or "no" at random, and posts its answer to the intake. The simulator is a
//! load source only; it never inspects who won.

use std::time::Duration;

use racer_common::config::DEFAULT_SUBMIT_URL;
use racer_common::Answer;
use rand::Rng;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Simulator errors
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub users: usize,
    pub endpoint: String,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub yes_probability: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            users: 10,
            endpoint: DEFAULT_SUBMIT_URL.to_string(),
            min_delay_ms: 10,
            max_delay_ms: 1000,
            yes_probability: 0.5,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.users == 0 {
            return Err(SimError::InvalidInput(
                "Please enter a positive integer number of users".to_string(),
            ));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(SimError::InvalidInput(format!(
                "min delay {}ms exceeds max delay {}ms",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.yes_probability) {
            return Err(SimError::InvalidInput(format!(
                "yes probability {} is outside 0.0..=1.0",
                self.yes_probability
            )));
        }
        Ok(())
    }
}

/// Totals reported after every participant finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimSummary {
    pub sent: usize,
    pub failed: usize,
    pub yes_answers: usize,
}

/// Pick one participant's delay and answer
pub fn draw_answer<R: Rng>(participant_id: i64, config: &SimConfig, rng: &mut R) -> Answer {
    let delay_ms = rng.gen_range(config.min_delay_ms..=config.max_delay_ms);
    let value = if rng.gen_bool(config.yes_probability) {
        "yes"
    } else {
        "no"
    };
    Answer::new(participant_id, value, delay_ms)
}

/// Wait the claimed delay, then post the answer
pub async fn simulate_participant(
    client: &reqwest::Client,
    endpoint: &str,
    answer: &Answer,
) -> Result<reqwest::StatusCode> {
    tokio::time::sleep(Duration::from_millis(answer.claimed_delay_ms)).await;

    let response = client
        .post(endpoint)
        .json(answer)
        .send()
        .await
        .map_err(|e| SimError::Client(e.to_string()))?;

    Ok(response.status())
}

/// Run every participant concurrently and wait for all of them
pub async fn run(config: &SimConfig) -> Result<SimSummary> {
    config.validate()?;

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .map_err(|e| SimError::Client(e.to_string()))?;

    let answers: Vec<Answer> = {
        let mut rng = rand::thread_rng();
        (1..=config.users as i64)
            .map(|id| draw_answer(id, config, &mut rng))
            .collect()
    };

    let mut summary = SimSummary {
        yes_answers: answers.iter().filter(|a| a.is_yes()).count(),
        ..SimSummary::default()
    };

    let mut participants = JoinSet::new();
    for answer in answers {
        let client = client.clone();
        let endpoint = config.endpoint.clone();
        participants.spawn(async move {
            match simulate_participant(&client, &endpoint, &answer).await {
                Ok(status) if status.is_success() => {
                    info!(
                        "User {} sent {} after {}ms → Status: {}",
                        answer.participant_id, answer.value, answer.claimed_delay_ms, status
                    );
                    true
                }
                Ok(status) => {
                    error!(
                        "User {} sent {} after {}ms → Status: {}",
                        answer.participant_id, answer.value, answer.claimed_delay_ms, status
                    );
                    false
                }
                Err(e) => {
                    error!("User {}: error sending request: {}", answer.participant_id, e);
                    false
                }
            }
        });
    }

    while let Some(result) = participants.join_next().await {
        match result {
            Ok(true) => summary.sent += 1,
            Ok(false) => summary.failed += 1,
            Err(e) => {
                error!("Participant task failed: {}", e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
