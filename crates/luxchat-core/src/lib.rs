//! Business logic and trait definitions for TheLUX Chat.
//!
//! This crate defines the "ports" (store, gateway, and configuration traits)
//! that the infrastructure layer implements, plus the session service and
//! directive synthesis. It depends only on `luxchat-types` -- never on
//! `luxchat-infra` or any database/IO crate.

pub mod config;
pub mod directive;
pub mod gateway;
pub mod session;
