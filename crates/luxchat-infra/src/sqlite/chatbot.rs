//! SQLite chatbot configuration repository.
//!
//! Implements `ChatbotConfigProvider` from `luxchat-core` and the CRUD
//! operations the management API needs. Same patterns as the transcript
//! store: raw queries, private Row struct, split reader/writer pool usage.

use luxchat_core::config::ChatbotConfigProvider;
use luxchat_types::chatbot::{ChatbotConfig, TraitProfile};
use luxchat_types::error::StoreError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed chatbot configuration repository.
pub struct SqliteChatbotRepository {
    pool: DatabasePool,
}

struct ChatbotRow {
    id: String,
    name: String,
    witty: Option<i64>,
    formal: Option<i64>,
    friendly: Option<i64>,
    purpose: Option<String>,
    window_size: i64,
    escalation_phrase: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ChatbotRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            witty: row.try_get("witty")?,
            formal: row.try_get("formal")?,
            friendly: row.try_get("friendly")?,
            purpose: row.try_get("purpose")?,
            window_size: row.try_get("window_size")?,
            escalation_phrase: row.try_get("escalation_phrase")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_config(self) -> Result<ChatbotConfig, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid chatbot id: {e}")))?;

        Ok(ChatbotConfig {
            id,
            name: self.name,
            traits: TraitProfile {
                witty: self.witty,
                formal: self.formal,
                friendly: self.friendly,
            },
            purpose: self.purpose,
            window_size: self.window_size.max(0) as u32,
            escalation_phrase: self.escalation_phrase,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

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

impl SqliteChatbotRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Persist a new chatbot configuration.
    pub async fn create(&self, config: &ChatbotConfig) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO chatbots (id, name, witty, formal, friendly, purpose, window_size, escalation_phrase, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(config.id.to_string())
        .bind(&config.name)
        .bind(config.traits.witty)
        .bind(config.traits.formal)
        .bind(config.traits.friendly)
        .bind(&config.purpose)
        .bind(config.window_size as i64)
        .bind(&config.escalation_phrase)
        .bind(config.created_at.to_rfc3339())
        .bind(config.updated_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    /// List all chatbots, most recently created first.
    pub async fn list(&self) -> Result<Vec<ChatbotConfig>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT id, name, witty, formal, friendly, purpose, window_size, escalation_phrase, created_at, updated_at
               FROM chatbots ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|row| {
                ChatbotRow::from_row(row)
                    .map_err(map_sqlx_err)?
                    .into_config()
            })
            .collect()
    }

    /// Delete a chatbot by id.
    pub async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM chatbots WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Count all chatbots (for the status CLI).
    pub async fn count(&self) -> Result<u64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chatbots")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;
        Ok(row.0 as u64)
    }
}

impl ChatbotConfigProvider for SqliteChatbotRepository {
    async fn get_config(&self, target_id: &Uuid) -> Result<Option<ChatbotConfig>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, name, witty, formal, friendly, purpose, window_size, escalation_phrase, created_at, updated_at
               FROM chatbots WHERE id = ?"#,
        )
        .bind(target_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        match row {
            Some(row) => {
                let parsed = ChatbotRow::from_row(&row).map_err(map_sqlx_err)?;
                Ok(Some(parsed.into_config()?))
            }
            None => Ok(None),
        }
    }
}
