//! SQLite transcript store implementation.
//!
//! Implements `TranscriptStore` from `luxchat-core` using sqlx with split
//! read/write pools. Messages persist as a JSON array in a single TEXT
//! column; appends are guarded by a compare-and-swap on the version column.

use luxchat_core::session::store::TranscriptStore;
use luxchat_types::error::StoreError;
use luxchat_types::llm::TurnMessage;
use luxchat_types::transcript::{Transcript, TranscriptStatus};
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TranscriptStore`.
pub struct SqliteTranscriptStore {
    pool: DatabasePool,
}

impl SqliteTranscriptStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Count all transcripts (for the status CLI).
    pub async fn count(&self) -> Result<u64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transcripts")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;
        Ok(row.0 as u64)
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct TranscriptRow {
    subject_id: String,
    target_id: String,
    messages: String,
    status: String,
    version: i64,
    updated_at: String,
}

impl TranscriptRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            subject_id: row.try_get("subject_id")?,
            target_id: row.try_get("target_id")?,
            messages: row.try_get("messages")?,
            status: row.try_get("status")?,
            version: row.try_get("version")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_transcript(self) -> Result<Transcript, StoreError> {
        let target_id = Uuid::parse_str(&self.target_id)
            .map_err(|e| StoreError::Query(format!("invalid target_id: {e}")))?;
        let messages: Vec<TurnMessage> = serde_json::from_str(&self.messages)
            .map_err(|e| StoreError::Query(format!("invalid messages payload: {e}")))?;
        let status: TranscriptStatus = self
            .status
            .parse()
            .map_err(|e: String| StoreError::Query(e))?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(Transcript {
            subject_id: self.subject_id,
            target_id,
            messages,
            status,
            version: self.version,
            updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid datetime: {e}")))
}

fn map_sqlx_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable
        }
        other => StoreError::Query(other.to_string()),
    }
}

fn serialize_messages(messages: &[TurnMessage]) -> Result<String, StoreError> {
    serde_json::to_string(messages)
        .map_err(|e| StoreError::Query(format!("failed to serialize messages: {e}")))
}

// ---------------------------------------------------------------------------
// TranscriptStore implementation
// ---------------------------------------------------------------------------

impl TranscriptStore for SqliteTranscriptStore {
    async fn get(
        &self,
        subject_id: &str,
        target_id: &Uuid,
    ) -> Result<Option<Transcript>, StoreError> {
        let row = sqlx::query(
            r#"SELECT subject_id, target_id, messages, status, version, updated_at
               FROM transcripts WHERE subject_id = ? AND target_id = ?"#,
        )
        .bind(subject_id)
        .bind(target_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        match row {
            Some(row) => {
                let parsed = TranscriptRow::from_row(&row).map_err(map_sqlx_err)?;
                Ok(Some(parsed.into_transcript()?))
            }
            None => Ok(None),
        }
    }

    async fn append_turn(
        &self,
        subject_id: &str,
        target_id: &Uuid,
        user_message: TurnMessage,
        assistant_message: TurnMessage,
        window_size: usize,
    ) -> Result<Transcript, StoreError> {
        let existing = self.get(subject_id, target_id).await?;
        let now = Utc::now();

        match existing {
            None => {
                let mut transcript = Transcript::empty(subject_id, *target_id);
                transcript.push_turn(user_message, assistant_message, window_size);
                transcript.version = 1;
                transcript.updated_at = now;

                let result = sqlx::query(
                    r#"INSERT INTO transcripts (subject_id, target_id, messages, status, version, updated_at)
                       VALUES (?, ?, ?, ?, ?, ?)"#,
                )
                .bind(subject_id)
                .bind(target_id.to_string())
                .bind(serialize_messages(&transcript.messages)?)
                .bind(transcript.status.to_string())
                .bind(transcript.version)
                .bind(now.to_rfc3339())
                .execute(&self.pool.writer)
                .await;

                match result {
                    Ok(_) => Ok(transcript),
                    // A racing writer created the row between our read and
                    // this insert; the caller retries with fresh state.
                    Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                        Err(StoreError::VersionConflict)
                    }
                    Err(e) => Err(map_sqlx_err(e)),
                }
            }
            Some(mut transcript) => {
                let read_version = transcript.version;
                transcript.push_turn(user_message, assistant_message, window_size);
                transcript.version = read_version + 1;
                transcript.updated_at = now;

                let result = sqlx::query(
                    r#"UPDATE transcripts
                       SET messages = ?, version = ?, updated_at = ?
                       WHERE subject_id = ? AND target_id = ? AND version = ?"#,
                )
                .bind(serialize_messages(&transcript.messages)?)
                .bind(transcript.version)
                .bind(now.to_rfc3339())
                .bind(subject_id)
                .bind(target_id.to_string())
                .bind(read_version)
                .execute(&self.pool.writer)
                .await
                .map_err(map_sqlx_err)?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::VersionConflict);
                }
                Ok(transcript)
            }
        }
    }

    async fn mark_status(
        &self,
        subject_id: &str,
        target_id: &Uuid,
        status: TranscriptStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"UPDATE transcripts SET status = ?, updated_at = ?
               WHERE subject_id = ? AND target_id = ?"#,
        )
        .bind(status.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(subject_id)
        .bind(target_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
