//! Shared domain types for TheLUX Chat.
//!
//! This crate defines the data shapes used across the workspace: transcripts
//! and their messages, chatbot configuration (trait profiles), and the error
//! taxonomy. It has no business logic and no I/O.

pub mod chatbot;
pub mod error;
pub mod llm;
pub mod transcript;
