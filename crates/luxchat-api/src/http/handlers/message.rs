//! Inbound message endpoints.
//!
//! - POST /api/v1/chat/messages    - general chat sessions
//! - POST /api/v1/support/messages - support-queue sessions with escalation
//!
//! Both accept `{subjectId, targetId, text}` and run one full session
//! cycle; the support variant adds the `escalated` flag to the response.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for both message endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessageRequest {
    /// Identifier of the end user (widget visitor).
    pub subject_id: String,
    /// Chatbot (or support queue) id.
    pub target_id: String,
    /// The inbound user message.
    pub text: String,
}

/// Response for the general chat endpoint.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Response for the support endpoint.
#[derive(Debug, Serialize)]
pub struct SupportReply {
    pub reply: String,
    pub escalated: bool,
}

fn parse_target(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("invalid targetId: {s}")))
}

/// POST /api/v1/chat/messages - answer one inbound chat message.
pub async fn chat_message(
    State(state): State<AppState>,
    Json(body): Json<InboundMessageRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let target_id = parse_target(&body.target_id)?;

    let reply = state
        .session_service
        .handle_message(&body.subject_id, &target_id, &body.text)
        .await?;

    Ok(Json(ChatReply { reply: reply.reply }))
}

/// POST /api/v1/support/messages - answer one inbound support message.
///
/// Escalation is detected from the generated reply; an escalated transcript
/// is flagged for human handoff and the response carries `escalated: true`.
pub async fn support_message(
    State(state): State<AppState>,
    Json(body): Json<InboundMessageRequest>,
) -> Result<Json<SupportReply>, AppError> {
    let target_id = parse_target(&body.target_id)?;

    let reply = state
        .session_service
        .handle_support_message(&body.subject_id, &target_id, &body.text)
        .await?;

    Ok(Json(SupportReply {
        reply: reply.reply,
        escalated: reply.escalated,
    }))
}
