//! LLM provider abstractions for HealthChat.
//!
//! - `LlmProvider`: the port concrete backends implement
//! - `BoxLlmProvider`: type-erased provider for UI drivers
//! - `stream`: the streaming chat client that turns provider events into
//!   plain text fragments

pub mod box_provider;
pub mod provider;
pub mod stream;
