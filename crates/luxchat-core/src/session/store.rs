//! TranscriptStore trait definition.
//!
//! Durable, idempotent access to transcripts keyed by (subject, target).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition);
//! implementations live in luxchat-infra (e.g., `SqliteTranscriptStore`).

use luxchat_types::error::StoreError;
use luxchat_types::llm::TurnMessage;
use luxchat_types::transcript::{Transcript, TranscriptStatus};
use uuid::Uuid;

/// Store trait for transcript persistence.
///
/// Writes are guarded by an optimistic version check: `append_turn` reads
/// the stored transcript, appends, and writes conditionally on the version
/// it read. A writer that loses the race gets `StoreError::VersionConflict`
/// and must retry with freshly read state; no update is ever silently lost.
pub trait TranscriptStore: Send + Sync {
    /// Fetch the transcript for a (subject, target) pair. No side effects.
    fn get(
        &self,
        subject_id: &str,
        target_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Transcript>, StoreError>> + Send;

    /// Append one user/assistant turn as a single logical unit.
    ///
    /// Creates the transcript with exactly `[user, assistant]` when no row
    /// exists for the key. Otherwise appends both messages in order, then
    /// truncates the persisted record to the most recent `window_size`
    /// messages. Returns the transcript as persisted.
    ///
    /// Performs one compare-and-swap attempt; returns
    /// `StoreError::VersionConflict` if the stored version moved between
    /// the internal read and the write.
    fn append_turn(
        &self,
        subject_id: &str,
        target_id: &Uuid,
        user_message: TurnMessage,
        assistant_message: TurnMessage,
        window_size: usize,
    ) -> impl std::future::Future<Output = Result<Transcript, StoreError>> + Send;

    /// Set the status flag without touching messages.
    ///
    /// Returns `StoreError::NotFound` if no transcript exists for the key.
    fn mark_status(
        &self,
        subject_id: &str,
        target_id: &Uuid,
        status: TranscriptStatus,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
