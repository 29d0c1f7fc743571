//! Application state wiring all services together.
//!
//! AppState holds the concrete session service used by both CLI and REST
//! API. The service is generic over store/gateway/config traits, but
//! AppState pins it to the concrete infra implementations -- no ambient
//! environment checks live below this layer.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use luxchat_core::session::service::SessionService;
use luxchat_infra::llm::OpenAiCompatGateway;
use luxchat_infra::sqlite::chatbot::SqliteChatbotRepository;
use luxchat_infra::sqlite::pool::DatabasePool;
use luxchat_infra::sqlite::transcript::SqliteTranscriptStore;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteSessionService =
    SessionService<SqliteTranscriptStore, OpenAiCompatGateway, SqliteChatbotRepository>;

/// Shared application state holding the session service.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<ConcreteSessionService>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    ///
    /// Gateway settings come from the environment:
    /// - `LUXCHAT_GATEWAY_API_KEY` (required for live completions)
    /// - `LUXCHAT_GATEWAY_URL` (default: https://api.openai.com)
    /// - `LUXCHAT_MODEL` (default: gpt-4o-mini)
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("luxchat.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let api_key = SecretString::from(
            std::env::var("LUXCHAT_GATEWAY_API_KEY").unwrap_or_default(),
        );
        let base_url = std::env::var("LUXCHAT_GATEWAY_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let model =
            std::env::var("LUXCHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let gateway = OpenAiCompatGateway::new(api_key, base_url, model);
        let transcript_store = SqliteTranscriptStore::new(db_pool.clone());
        let chatbot_repo = SqliteChatbotRepository::new(db_pool);

        let session_service = SessionService::new(transcript_store, gateway, chatbot_repo);

        Ok(Self {
            session_service: Arc::new(session_service),
            data_dir,
        })
    }
}

/// Resolve the data directory from `LUXCHAT_DATA_DIR`, falling back to
/// `~/.luxchat`.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var("LUXCHAT_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".luxchat")
        }
    }
}
