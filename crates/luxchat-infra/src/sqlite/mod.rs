//! SQLite persistence layer.

pub mod chatbot;
pub mod pool;
pub mod transcript;
