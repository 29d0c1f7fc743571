//! Chatbot configuration CRUD handlers.
//!
//! Endpoints:
//! - POST   /api/v1/chatbots      - create a chatbot
//! - GET    /api/v1/chatbots      - list chatbots
//! - GET    /api/v1/chatbots/{id} - get one chatbot
//! - DELETE /api/v1/chatbots/{id} - delete a chatbot

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use luxchat_core::config::ChatbotConfigProvider;
use luxchat_types::chatbot::{ChatbotConfig, DEFAULT_WINDOW_SIZE, TraitProfile};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for chatbot creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatbotRequest {
    pub name: String,
    #[serde(default)]
    pub traits: TraitProfile,
    pub purpose: Option<String>,
    pub window_size: Option<u32>,
    pub escalation_phrase: Option<String>,
}

/// Wire shape of a chatbot configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotResponse {
    pub id: Uuid,
    pub name: String,
    pub traits: TraitProfile,
    pub purpose: Option<String>,
    pub window_size: u32,
    pub escalation_phrase: Option<String>,
}

impl From<ChatbotConfig> for ChatbotResponse {
    fn from(c: ChatbotConfig) -> Self {
        Self {
            id: c.id,
            name: c.name,
            traits: c.traits,
            purpose: c.purpose,
            window_size: c.window_size,
            escalation_phrase: c.escalation_phrase,
        }
    }
}

fn parse_id(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("invalid chatbot id: {s}")))
}

/// Turns appended after truncation are user/assistant pairs, so a window
/// below 2 could never retain a full turn.
fn validate_window(requested: Option<u32>) -> Result<u32, AppError> {
    match requested {
        None => Ok(DEFAULT_WINDOW_SIZE),
        Some(w) if w >= 2 => Ok(w),
        Some(w) => Err(AppError::Validation(format!(
            "windowSize must be at least 2, got {w}"
        ))),
    }
}

/// POST /api/v1/chatbots - create a chatbot.
pub async fn create_chatbot(
    State(state): State<AppState>,
    Json(body): Json<CreateChatbotRequest>,
) -> Result<(StatusCode, Json<ChatbotResponse>), AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    let window_size = validate_window(body.window_size)?;

    let now = Utc::now();
    let config = ChatbotConfig {
        id: Uuid::now_v7(),
        name: name.to_string(),
        traits: body.traits,
        purpose: body.purpose,
        window_size,
        escalation_phrase: body.escalation_phrase,
        created_at: now,
        updated_at: now,
    };

    state
        .session_service
        .config_provider()
        .create(&config)
        .await?;

    Ok((StatusCode::CREATED, Json(config.into())))
}

/// GET /api/v1/chatbots - list all chatbots.
pub async fn list_chatbots(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatbotResponse>>, AppError> {
    let chatbots = state.session_service.config_provider().list().await?;
    Ok(Json(chatbots.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/chatbots/{id} - get one chatbot.
pub async fn get_chatbot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChatbotResponse>, AppError> {
    let id = parse_id(&id)?;

    let config = state
        .session_service
        .config_provider()
        .get_config(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("chatbot not found".to_string()))?;

    Ok(Json(config.into()))
}

/// DELETE /api/v1/chatbots/{id} - delete a chatbot.
pub async fn delete_chatbot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.session_service.config_provider().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults_when_unset() {
        assert_eq!(validate_window(None).unwrap(), DEFAULT_WINDOW_SIZE);
    }

    #[test]
    fn test_window_must_hold_one_full_turn() {
        assert_eq!(validate_window(Some(2)).unwrap(), 2);
        assert_eq!(validate_window(Some(50)).unwrap(), 50);
        assert!(validate_window(Some(1)).is_err());
        assert!(validate_window(Some(0)).is_err());
    }
}
