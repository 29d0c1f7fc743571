//! HTTP request handlers.

pub mod chatbot;
pub mod message;
pub mod transcript;
