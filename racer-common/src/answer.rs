//! The `Answer` contract shared by every stage of the race
//!
//! On the wire an answer is `{"user_id": int, "response": string, "delay_ms": int}`.
//! Decoding is lenient: keys match case-insensitively, missing fields fall back
//! to zero values, a `null` field leaves the value untouched and unknown fields
//! are ignored. Only a body that is not JSON, or whose fields have the wrong
//! type, is rejected.

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// The only correct answer
pub const CORRECT_ANSWER: &str = "yes";

/// One participant's submitted answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// Participant identity (not unique across retries)
    #[serde(rename = "user_id")]
    pub participant_id: i64,

    /// Submitted value, semantically "yes" or "no"
    #[serde(rename = "response")]
    pub value: String,

    /// Delay the participant claims to have waited; reported, never verified
    #[serde(rename = "delay_ms")]
    pub claimed_delay_ms: u64,
}

impl Answer {
    pub fn new(participant_id: i64, value: impl Into<String>, claimed_delay_ms: u64) -> Self {
        Self {
            participant_id,
            value: value.into(),
            claimed_delay_ms,
        }
    }

    /// Decode an answer from a raw request body
    pub fn decode(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::InvalidInput(e.to_string()))
    }

    /// True when this answer can win the race
    pub fn is_yes(&self) -> bool {
        self.value == CORRECT_ANSWER
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AnswerVisitor)
    }
}

struct AnswerVisitor;

impl<'de> Visitor<'de> for AnswerVisitor {
    type Value = Answer;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an answer object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Answer, A::Error> {
        let mut answer = Answer::default();

        // Later keys overwrite earlier ones, whatever their spelling
        while let Some(key) = map.next_key::<String>()? {
            match key.to_lowercase().as_str() {
                "user_id" => {
                    if let Some(id) = map.next_value::<Option<i64>>()? {
                        answer.participant_id = id;
                    }
                }
                "response" => {
                    if let Some(value) = map.next_value::<Option<String>>()? {
                        answer.value = value;
                    }
                }
                "delay_ms" => {
                    if let Some(delay) = map.next_value::<Option<u64>>()? {
                        answer.claimed_delay_ms = delay;
                    }
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(answer)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Answer, E> {
        Ok(Answer::default())
    }
}
