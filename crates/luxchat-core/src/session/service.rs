//! Session service orchestrating one inbound-message cycle.
//!
//! SessionService coordinates the transcript store, the chatbot
//! configuration provider, and the completion gateway to answer exactly one
//! inbound user message per invocation: read prior state, synthesize the
//! directive, call the gateway, persist the turn.

use luxchat_types::error::{SessionError, StoreError};
use luxchat_types::llm::TurnMessage;
use luxchat_types::transcript::{Transcript, TranscriptStatus};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ChatbotConfigProvider;
use crate::directive;
use crate::gateway::CompletionGateway;
use crate::session::store::TranscriptStore;

/// Attempts made to win the optimistic version race before giving up.
const APPEND_ATTEMPTS: u32 = 3;

/// The outcome of one handled message.
#[derive(Debug, Clone)]
pub struct SessionReply {
    /// The generated assistant message.
    pub reply: String,
    /// Whether the reply triggered a support escalation.
    pub escalated: bool,
    /// Whether the turn made it into the store. A `false` here is logged
    /// for reconciliation but never surfaced to the end user, who already
    /// has the reply.
    pub persisted: bool,
}

/// Orchestrates one request/response cycle per inbound message.
///
/// Generic over the store, gateway, and configuration traits so each
/// collaborator is independently mockable (luxchat-core never depends on
/// luxchat-infra). All request state is local to the invocation; the
/// service itself is stateless and shareable.
pub struct SessionService<S, G, C> {
    store: S,
    gateway: G,
    config_provider: C,
}

impl<S, G, C> SessionService<S, G, C>
where
    S: TranscriptStore,
    G: CompletionGateway,
    C: ChatbotConfigProvider,
{
    /// Create a new session service with the given collaborators.
    pub fn new(store: S, gateway: G, config_provider: C) -> Self {
        Self {
            store,
            gateway,
            config_provider,
        }
    }

    /// Access the transcript store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Access the completion gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Access the configuration provider.
    pub fn config_provider(&self) -> &C {
        &self.config_provider
    }

    /// Handle one inbound message for a general chat session.
    ///
    /// Sequence: validate, load config, load transcript, build the outgoing
    /// window, call the gateway, append the turn. The gateway is never
    /// called when prior state could not be loaded, and the store is never
    /// mutated when the gateway call failed.
    pub async fn handle_message(
        &self,
        subject_id: &str,
        target_id: &Uuid,
        text: &str,
    ) -> Result<SessionReply, SessionError> {
        let (reply, _) = self.run_cycle(subject_id, target_id, text).await?;
        Ok(reply)
    }

    /// Handle one inbound message for a support-queue session.
    ///
    /// Same cycle as [`handle_message`], then scans the reply for the
    /// chatbot's configured escalation phrase (case-sensitive substring;
    /// legacy compatibility behavior until gateways return structured
    /// escalation output). On a match, the transcript is marked escalated.
    ///
    /// [`handle_message`]: Self::handle_message
    pub async fn handle_support_message(
        &self,
        subject_id: &str,
        target_id: &Uuid,
        text: &str,
    ) -> Result<SessionReply, SessionError> {
        let (mut reply, config) = self.run_cycle(subject_id, target_id, text).await?;

        let escalate = config
            .escalation_phrase
            .as_deref()
            .is_some_and(|phrase| !phrase.is_empty() && reply.reply.contains(phrase));

        if escalate {
            reply.escalated = true;
            if let Err(e) = self
                .store
                .mark_status(subject_id.trim(), target_id, TranscriptStatus::Escalated)
                .await
            {
                // The caller still learns about the escalation; the flag
                // write is reconciled from logs.
                warn!(%target_id, error = %e, "failed to mark transcript escalated");
            }
        }

        Ok(reply)
    }

    async fn run_cycle(
        &self,
        subject_id: &str,
        target_id: &Uuid,
        text: &str,
    ) -> Result<(SessionReply, luxchat_types::chatbot::ChatbotConfig), SessionError> {
        let subject_id = subject_id.trim();
        if subject_id.is_empty() {
            return Err(SessionError::InvalidRequest(
                "subject_id must not be empty".to_string(),
            ));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::InvalidRequest(
                "text must not be empty".to_string(),
            ));
        }

        let config = self
            .config_provider
            .get_config(target_id)
            .await
            .map_err(|e| {
                warn!(%target_id, error = %e, "config lookup failed");
                SessionError::StorageUnavailable
            })?
            .ok_or(SessionError::TargetNotFound)?;

        // Prior state must be known before generating: a contextless or
        // duplicate reply is worse than a failed request.
        let transcript = self
            .store
            .get(subject_id, target_id)
            .await
            .map_err(|e| {
                warn!(%target_id, error = %e, "transcript read failed");
                SessionError::StorageUnavailable
            })?
            .unwrap_or_else(|| Transcript::empty(subject_id, *target_id));

        let window_size = config.effective_window();
        let system_directive = directive::synthesize(&config.traits, config.purpose.as_deref());

        let mut outgoing: Vec<TurnMessage> = transcript.window(window_size).to_vec();
        outgoing.push(TurnMessage::user(text));

        let assistant_text = self
            .gateway
            .complete(&system_directive, &outgoing)
            .await
            .map_err(|e| {
                warn!(%target_id, gateway = self.gateway.name(), error = %e, "completion failed");
                SessionError::CompletionFailed(e.to_string())
            })?;

        let persisted = match self
            .append_with_retry(subject_id, target_id, text, &assistant_text, window_size)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                // The reply already exists; losing the write-back must not
                // cost the user their answer. Logged for reconciliation.
                warn!(%target_id, subject_id, error = %e, "turn not persisted");
                false
            }
        };

        Ok((
            SessionReply {
                reply: assistant_text,
                escalated: false,
                persisted,
            },
            config,
        ))
    }

    /// Append the turn, absorbing a bounded number of version-race losses.
    ///
    /// Each attempt re-reads fresh state inside the store, so retrying is
    /// enough to converge under contention. Conflicts that survive every
    /// attempt surface as `ConflictRetry`; other write failures as
    /// `PersistenceFailed`.
    async fn append_with_retry(
        &self,
        subject_id: &str,
        target_id: &Uuid,
        user_text: &str,
        assistant_text: &str,
        window_size: usize,
    ) -> Result<(), SessionError> {
        for attempt in 1..=APPEND_ATTEMPTS {
            match self
                .store
                .append_turn(
                    subject_id,
                    target_id,
                    TurnMessage::user(user_text),
                    TurnMessage::assistant(assistant_text),
                    window_size,
                )
                .await
            {
                Ok(_) => return Ok(()),
                Err(StoreError::VersionConflict) => {
                    debug!(%target_id, attempt, "append lost version race, retrying");
                }
                Err(e) => {
                    warn!(%target_id, error = %e, "append failed");
                    return Err(SessionError::PersistenceFailed);
                }
            }
        }
        Err(SessionError::ConflictRetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxchat_types::chatbot::{ChatbotConfig, TraitProfile};
    use luxchat_types::llm::GatewayError;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    // --- In-memory collaborators ---

    #[derive(Default)]
    struct MemoryStore {
        transcripts: Mutex<HashMap<(String, Uuid), Transcript>>,
        fail_reads: bool,
        fail_writes: bool,
        /// Number of times append_turn reports a version conflict before
        /// succeeding.
        conflicts: AtomicU32,
    }

    impl MemoryStore {
        fn snapshot(&self, subject_id: &str, target_id: &Uuid) -> Option<Transcript> {
            self.transcripts
                .lock()
                .unwrap()
                .get(&(subject_id.to_string(), *target_id))
                .cloned()
        }

        fn len(&self) -> usize {
            self.transcripts.lock().unwrap().len()
        }
    }

    impl TranscriptStore for MemoryStore {
        async fn get(
            &self,
            subject_id: &str,
            target_id: &Uuid,
        ) -> Result<Option<Transcript>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Unavailable);
            }
            Ok(self.snapshot(subject_id, target_id))
        }

        async fn append_turn(
            &self,
            subject_id: &str,
            target_id: &Uuid,
            user_message: TurnMessage,
            assistant_message: TurnMessage,
            window_size: usize,
        ) -> Result<Transcript, StoreError> {
            if self.fail_writes {
                return Err(StoreError::Query("disk full".to_string()));
            }
            if self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::VersionConflict);
            }
            let mut map = self.transcripts.lock().unwrap();
            let key = (subject_id.to_string(), *target_id);
            let transcript = map
                .entry(key)
                .or_insert_with(|| Transcript::empty(subject_id, *target_id));
            transcript.push_turn(user_message, assistant_message, window_size);
            transcript.version += 1;
            transcript.updated_at = chrono::Utc::now();
            Ok(transcript.clone())
        }

        async fn mark_status(
            &self,
            subject_id: &str,
            target_id: &Uuid,
            status: TranscriptStatus,
        ) -> Result<(), StoreError> {
            let mut map = self.transcripts.lock().unwrap();
            match map.get_mut(&(subject_id.to_string(), *target_id)) {
                Some(t) => {
                    t.status = status;
                    Ok(())
                }
                None => Err(StoreError::NotFound),
            }
        }
    }

    struct ScriptedGateway {
        reply: Result<String, ()>,
        /// Every (directive, messages) pair this gateway was called with.
        calls: Mutex<Vec<(String, Vec<TurnMessage>)>>,
    }

    impl ScriptedGateway {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_call(&self) -> (String, Vec<TurnMessage>) {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl CompletionGateway for ScriptedGateway {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            directive: &str,
            messages: &[TurnMessage],
        ) -> Result<String, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((directive.to_string(), messages.to_vec()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(GatewayError::Timeout),
            }
        }
    }

    struct FixedConfig {
        config: Option<ChatbotConfig>,
    }

    impl ChatbotConfigProvider for FixedConfig {
        async fn get_config(
            &self,
            target_id: &Uuid,
        ) -> Result<Option<ChatbotConfig>, StoreError> {
            Ok(self
                .config
                .clone()
                .filter(|c| c.id == *target_id))
        }
    }

    fn test_config(target_id: Uuid) -> ChatbotConfig {
        ChatbotConfig {
            id: target_id,
            name: "Helper".to_string(),
            traits: TraitProfile::default(),
            purpose: Some("help users".to_string()),
            window_size: 10,
            escalation_phrase: Some("connect you with a human".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn service(
        store: MemoryStore,
        gateway: ScriptedGateway,
        target_id: Uuid,
    ) -> SessionService<MemoryStore, ScriptedGateway, FixedConfig> {
        SessionService::new(
            store,
            gateway,
            FixedConfig {
                config: Some(test_config(target_id)),
            },
        )
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_first_turn_creates_transcript() {
        let target = Uuid::now_v7();
        let svc = service(MemoryStore::default(), ScriptedGateway::replying("Hello!"), target);

        let reply = svc.handle_message("visitor-1", &target, "Hi").await.unwrap();
        assert_eq!(reply.reply, "Hello!");
        assert!(reply.persisted);
        assert!(!reply.escalated);

        let t = svc.store().snapshot("visitor-1", &target).unwrap();
        assert_eq!(t.messages.len(), 2);
        assert_eq!(t.messages[0], TurnMessage::user("Hi"));
        assert_eq!(t.messages[1], TurnMessage::assistant("Hello!"));
    }

    #[tokio::test]
    async fn test_append_only_ordering() {
        let target = Uuid::now_v7();
        let svc = service(MemoryStore::default(), ScriptedGateway::replying("ok"), target);

        for i in 0..4 {
            svc.handle_message("visitor-1", &target, &format!("msg {i}"))
                .await
                .unwrap();
        }

        let t = svc.store().snapshot("visitor-1", &target).unwrap();
        assert_eq!(t.messages.len(), 8);
        for i in 0..4 {
            assert_eq!(t.messages[2 * i].content, format!("msg {i}"));
            assert_eq!(t.messages[2 * i + 1].content, "ok");
        }
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_input() {
        let target = Uuid::now_v7();
        let svc = service(MemoryStore::default(), ScriptedGateway::replying("ok"), target);

        let err = svc.handle_message("", &target, "Hi").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(_)));

        let err = svc.handle_message("visitor-1", &target, "   ").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(_)));

        // Nothing reached the gateway or the store
        assert_eq!(svc.gateway().call_count(), 0);
        assert_eq!(svc.store().len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let target = Uuid::now_v7();
        let svc = service(MemoryStore::default(), ScriptedGateway::replying("ok"), target);

        let other = Uuid::now_v7();
        let err = svc.handle_message("visitor-1", &other, "Hi").await.unwrap_err();
        assert!(matches!(err, SessionError::TargetNotFound));
        assert_eq!(svc.gateway().call_count(), 0);
    }

    #[tokio::test]
    async fn test_read_failure_skips_gateway() {
        let target = Uuid::now_v7();
        let store = MemoryStore {
            fail_reads: true,
            ..Default::default()
        };
        let svc = service(store, ScriptedGateway::replying("ok"), target);

        let err = svc.handle_message("visitor-1", &target, "Hi").await.unwrap_err();
        assert!(matches!(err, SessionError::StorageUnavailable));
        assert_eq!(svc.gateway().call_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_store_untouched() {
        let target = Uuid::now_v7();
        let svc = service(MemoryStore::default(), ScriptedGateway::failing(), target);

        let err = svc.handle_message("visitor-1", &target, "Hi").await.unwrap_err();
        assert!(matches!(err, SessionError::CompletionFailed(_)));
        assert_eq!(svc.store().len(), 0);
    }

    #[tokio::test]
    async fn test_outgoing_context_is_windowed() {
        let target = Uuid::now_v7();
        let store = MemoryStore::default();
        // Pre-seed 7 turns (14 messages) with a generous window so history
        // exceeds the configured window of 10.
        {
            let mut map = store.transcripts.lock().unwrap();
            let mut t = Transcript::empty("visitor-1", target);
            for i in 0..7 {
                t.push_turn(
                    TurnMessage::user(format!("q{i}")),
                    TurnMessage::assistant(format!("a{i}")),
                    100,
                );
            }
            t.version = 7;
            map.insert(("visitor-1".to_string(), target), t);
        }
        let svc = service(store, ScriptedGateway::replying("ok"), target);

        svc.handle_message("visitor-1", &target, "latest").await.unwrap();

        let (directive, messages) = svc.gateway().last_call();
        // 10 windowed messages + the inbound one
        assert_eq!(messages.len(), 11);
        assert_eq!(messages[0].content, "q2");
        assert_eq!(messages[10].content, "latest");
        assert!(directive.ends_with("help users."));
    }

    #[tokio::test]
    async fn test_persisted_record_is_capped_at_window() {
        let target = Uuid::now_v7();
        let svc = service(MemoryStore::default(), ScriptedGateway::replying("ok"), target);

        // Window of 10 -> 6 turns would be 12 messages; stored stays at 10.
        for i in 0..6 {
            svc.handle_message("visitor-1", &target, &format!("q{i}"))
                .await
                .unwrap();
        }

        let t = svc.store().snapshot("visitor-1", &target).unwrap();
        assert_eq!(t.messages.len(), 10);
        assert_eq!(t.messages[0].content, "q1");
    }

    #[tokio::test]
    async fn test_version_conflict_is_retried() {
        let target = Uuid::now_v7();
        let store = MemoryStore::default();
        store.conflicts.store(2, Ordering::SeqCst);
        let svc = service(store, ScriptedGateway::replying("Hello!"), target);

        let reply = svc.handle_message("visitor-1", &target, "Hi").await.unwrap();
        assert!(reply.persisted);
        assert!(svc.store().snapshot("visitor-1", &target).is_some());
    }

    #[tokio::test]
    async fn test_exhausted_conflicts_still_return_reply() {
        let target = Uuid::now_v7();
        let store = MemoryStore::default();
        store.conflicts.store(10, Ordering::SeqCst);
        let svc = service(store, ScriptedGateway::replying("Hello!"), target);

        let reply = svc.handle_message("visitor-1", &target, "Hi").await.unwrap();
        assert_eq!(reply.reply, "Hello!");
        assert!(!reply.persisted);
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_reply() {
        let target = Uuid::now_v7();
        let store = MemoryStore {
            fail_writes: true,
            ..Default::default()
        };
        let svc = service(store, ScriptedGateway::replying("Hello!"), target);

        let reply = svc.handle_message("visitor-1", &target, "Hi").await.unwrap();
        assert_eq!(reply.reply, "Hello!");
        assert!(!reply.persisted);
    }

    #[tokio::test]
    async fn test_support_escalation_on_phrase_match() {
        let target = Uuid::now_v7();
        let svc = service(
            MemoryStore::default(),
            ScriptedGateway::replying("Let me connect you with a human agent."),
            target,
        );

        let reply = svc
            .handle_support_message("visitor-1", &target, "I want a refund")
            .await
            .unwrap();
        assert!(reply.escalated);

        let t = svc.store().snapshot("visitor-1", &target).unwrap();
        assert_eq!(t.status, TranscriptStatus::Escalated);
    }

    #[tokio::test]
    async fn test_support_no_escalation_without_phrase() {
        let target = Uuid::now_v7();
        let svc = service(
            MemoryStore::default(),
            ScriptedGateway::replying("Refunds take 3-5 business days."),
            target,
        );

        let reply = svc
            .handle_support_message("visitor-1", &target, "I want a refund")
            .await
            .unwrap();
        assert!(!reply.escalated);

        let t = svc.store().snapshot("visitor-1", &target).unwrap();
        assert_eq!(t.status, TranscriptStatus::Open);
    }

    #[tokio::test]
    async fn test_escalation_phrase_is_case_sensitive() {
        let target = Uuid::now_v7();
        let svc = service(
            MemoryStore::default(),
            ScriptedGateway::replying("Let me CONNECT YOU WITH A HUMAN."),
            target,
        );

        let reply = svc
            .handle_support_message("visitor-1", &target, "help")
            .await
            .unwrap();
        assert!(!reply.escalated);
    }
}
