//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS (the chat widget is embedded on arbitrary origins),
//! request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Inbound messages
        .route("/chat/messages", post(handlers::message::chat_message))
        .route(
            "/support/messages",
            post(handlers::message::support_message),
        )
        // Transcript reads
        .route(
            "/transcripts/{target_id}/{subject_id}",
            get(handlers::transcript::get_transcript),
        )
        // Chatbot management
        .route(
            "/chatbots",
            post(handlers::chatbot::create_chatbot).get(handlers::chatbot::list_chatbots),
        )
        .route(
            "/chatbots/{id}",
            get(handlers::chatbot::get_chatbot).delete(handlers::chatbot::delete_chatbot),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
