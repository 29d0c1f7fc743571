//! Transcript types for TheLUX Chat.
//!
//! A transcript is the full ordered message history for one
//! (subject, target) pair: one per (end user, chatbot), or per
//! (end user, support queue) for support conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::llm::TurnMessage;

/// Status flag of a transcript.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (status IN ('open', 'escalated'))`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Open,
    Escalated,
}

impl fmt::Display for TranscriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptStatus::Open => write!(f, "open"),
            TranscriptStatus::Escalated => write!(f, "escalated"),
        }
    }
}

impl FromStr for TranscriptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TranscriptStatus::Open),
            "escalated" => Ok(TranscriptStatus::Escalated),
            other => Err(format!("invalid transcript status: '{other}'")),
        }
    }
}

impl Default for TranscriptStatus {
    fn default() -> Self {
        TranscriptStatus::Open
    }
}

/// The ordered message history for one (subject, target) pair.
///
/// Messages preserve strict insertion order; individual messages are never
/// reordered or deleted. The only destructive operation is whole-transcript
/// truncation to the most recent window, applied before persisting.
///
/// `version` increases monotonically on every write and backs the
/// compare-and-swap in the store: a writer that read version N may only
/// replace version N.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub subject_id: String,
    pub target_id: Uuid,
    pub messages: Vec<TurnMessage>,
    pub status: TranscriptStatus,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    /// An empty, never-persisted transcript for a fresh key.
    pub fn empty(subject_id: impl Into<String>, target_id: Uuid) -> Self {
        Self {
            subject_id: subject_id.into(),
            target_id,
            messages: Vec::new(),
            status: TranscriptStatus::Open,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// The most recent `window_size` messages, oldest first.
    ///
    /// Returns the whole history when it is shorter than the window.
    pub fn window(&self, window_size: usize) -> &[TurnMessage] {
        let start = self.messages.len().saturating_sub(window_size);
        &self.messages[start..]
    }

    /// Append a user/assistant pair and truncate to the most recent
    /// `window_size` messages.
    ///
    /// The pair is appended first, so with a window of W and W messages
    /// already present, the oldest pair falls off.
    pub fn push_turn(
        &mut self,
        user_message: TurnMessage,
        assistant_message: TurnMessage,
        window_size: usize,
    ) {
        self.messages.push(user_message);
        self.messages.push(assistant_message);
        let excess = self.messages.len().saturating_sub(window_size);
        if excess > 0 {
            self.messages.drain(..excess);
        }
    }
}
