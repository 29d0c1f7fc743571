//! ChatbotConfigProvider trait definition.
//!
//! Lookup of chatbot configuration (trait profile, purpose, window size,
//! escalation phrase) by target id. Implementations live in luxchat-infra.

use luxchat_types::chatbot::ChatbotConfig;
use luxchat_types::error::StoreError;
use uuid::Uuid;

/// Provider trait for chatbot configuration lookup.
pub trait ChatbotConfigProvider: Send + Sync {
    /// Fetch the configuration for a target, or `None` if it does not exist.
    fn get_config(
        &self,
        target_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatbotConfig>, StoreError>> + Send;
}
