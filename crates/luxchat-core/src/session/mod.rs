//! Transcript persistence abstraction and the session service.
//!
//! `store` defines the `TranscriptStore` trait that the infrastructure
//! layer implements; `service` orchestrates one inbound-message cycle.

pub mod service;
pub mod store;
