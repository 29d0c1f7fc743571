//! Infrastructure implementations for TheLUX Chat.
//!
//! Implements the traits defined in `luxchat-core`: SQLite-backed transcript
//! and chatbot stores (sqlx, WAL, split reader/writer pools) and the
//! OpenAI-compatible completion gateway (reqwest).

pub mod llm;
pub mod sqlite;
