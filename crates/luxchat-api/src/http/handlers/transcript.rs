//! Transcript read endpoint.
//!
//! GET /api/v1/transcripts/{target_id}/{subject_id}

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use luxchat_core::session::store::TranscriptStore;
use luxchat_types::llm::TurnMessage;
use luxchat_types::transcript::TranscriptStatus;

use crate::http::error::AppError;
use crate::state::AppState;

/// Wire shape of a transcript read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub subject_id: String,
    pub target_id: Uuid,
    pub status: TranscriptStatus,
    pub messages: Vec<TurnMessage>,
    pub updated_at: DateTime<Utc>,
}

/// GET /api/v1/transcripts/{target_id}/{subject_id} - read one transcript.
pub async fn get_transcript(
    State(state): State<AppState>,
    Path((target_id, subject_id)): Path<(String, String)>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let target_id = target_id
        .parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("invalid target id: {target_id}")))?;

    let transcript = state
        .session_service
        .store()
        .get(&subject_id, &target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("transcript not found".to_string()))?;

    Ok(Json(TranscriptResponse {
        subject_id: transcript.subject_id,
        target_id: transcript.target_id,
        status: transcript.status,
        messages: transcript.messages,
        updated_at: transcript.updated_at,
    }))
}
