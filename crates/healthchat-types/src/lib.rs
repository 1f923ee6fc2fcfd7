//! Shared domain types for HealthChat.
//!
//! This crate contains the value types passed between the safety gate, the
//! streaming chat orchestrator, the inference provider and the UI layers:
//! LLM messages and stream events, transcript entries, configuration, and
//! the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
