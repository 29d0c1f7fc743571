//! CompletionGateway trait definition.
//!
//! The completion gateway is the external collaborator that turns a system
//! directive plus an ordered message window into the next assistant message.
//! The trait is provider-agnostic; implementations live in luxchat-infra.

use luxchat_types::llm::{GatewayError, TurnMessage};

/// Trait for completion backends.
///
/// Implementations must bound every call with a timeout; a timed-out call
/// surfaces as `GatewayError::Timeout` and is treated by callers exactly
/// like any other gateway failure (no transcript mutation).
pub trait CompletionGateway: Send + Sync {
    /// Human-readable gateway name (e.g., "openai_compatible").
    fn name(&self) -> &str;

    /// Produce the next assistant message for the given directive and
    /// message window. `messages` is ordered oldest-first and already ends
    /// with the inbound user message.
    fn complete(
        &self,
        directive: &str,
        messages: &[TurnMessage],
    ) -> impl std::future::Future<Output = Result<String, GatewayError>> + Send;
}
