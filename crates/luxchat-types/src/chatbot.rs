//! Chatbot configuration types.
//!
//! A chatbot carries a trait profile (witty/formal/friendly scores), a
//! purpose string, and the session parameters (window size, escalation
//! phrase) the session service needs for one request cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of trailing messages kept per transcript and sent to the
/// completion gateway.
pub const DEFAULT_WINDOW_SIZE: u32 = 10;

/// Trait score applied when a chatbot leaves one unset.
pub const DEFAULT_TRAIT_SCORE: u8 = 50;

/// Named personality trait scores attached to a chatbot.
///
/// Raw values come from user input or the database and may be out of range;
/// the accessors clamp each score independently to [0, 100] and default
/// missing scores to 50.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitProfile {
    pub witty: Option<i64>,
    pub formal: Option<i64>,
    pub friendly: Option<i64>,
}

impl TraitProfile {
    /// Witty score, clamped to [0, 100], defaulting to 50.
    pub fn witty(&self) -> u8 {
        Self::clamp(self.witty)
    }

    /// Formal score, clamped to [0, 100], defaulting to 50.
    pub fn formal(&self) -> u8 {
        Self::clamp(self.formal)
    }

    /// Friendly score, clamped to [0, 100], defaulting to 50.
    pub fn friendly(&self) -> u8 {
        Self::clamp(self.friendly)
    }

    fn clamp(raw: Option<i64>) -> u8 {
        match raw {
            Some(v) => v.clamp(0, 100) as u8,
            None => DEFAULT_TRAIT_SCORE,
        }
    }
}

/// Configuration of a single chatbot (a conversation target).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotConfig {
    pub id: Uuid,
    pub name: String,
    pub traits: TraitProfile,
    /// What the assistant is for; feeds the closing directive sentence.
    pub purpose: Option<String>,
    /// Maximum trailing messages kept per transcript and sent per call.
    pub window_size: u32,
    /// Substring whose presence in an assistant reply escalates a support
    /// transcript to a human. Case-sensitive match.
    pub escalation_phrase: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatbotConfig {
    /// Window size as a usize, never zero (a zero window would make every
    /// append a no-op; fall back to the default instead).
    pub fn effective_window(&self) -> usize {
        if self.window_size == 0 {
            DEFAULT_WINDOW_SIZE as usize
        } else {
            self.window_size as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_window(window_size: u32) -> ChatbotConfig {
        ChatbotConfig {
            id: Uuid::now_v7(),
            name: "Support Bot".to_string(),
            traits: TraitProfile::default(),
            purpose: None,
            window_size,
            escalation_phrase: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_trait_defaults_to_50() {
        let traits = TraitProfile::default();
        assert_eq!(traits.witty(), 50);
        assert_eq!(traits.formal(), 50);
        assert_eq!(traits.friendly(), 50);
    }

    #[test]
    fn test_trait_clamps_out_of_range() {
        let traits = TraitProfile {
            witty: Some(150),
            formal: Some(-20),
            friendly: Some(100),
        };
        assert_eq!(traits.witty(), 100);
        assert_eq!(traits.formal(), 0);
        assert_eq!(traits.friendly(), 100);
    }

    #[test]
    fn test_trait_in_range_passthrough() {
        let traits = TraitProfile {
            witty: Some(71),
            formal: Some(40),
            friendly: Some(0),
        };
        assert_eq!(traits.witty(), 71);
        assert_eq!(traits.formal(), 40);
        assert_eq!(traits.friendly(), 0);
    }

    #[test]
    fn test_effective_window() {
        assert_eq!(config_with_window(10).effective_window(), 10);
        assert_eq!(config_with_window(4).effective_window(), 4);
        assert_eq!(
            config_with_window(0).effective_window(),
            DEFAULT_WINDOW_SIZE as usize
        );
    }
}
