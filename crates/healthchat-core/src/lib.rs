//! Business logic for HealthChat.
//!
//! Everything here is independent of the inference backend and of the UI:
//! the keyword safety gate, the prompt bundle, conversation assembly, the
//! `LlmProvider` port and the safety-gated streaming chat service that keeps
//! a per-session transcript. Concrete providers live in `healthchat-infra`.

pub mod chat;
pub mod conversation;
pub mod llm;
pub mod prompt;
pub mod safety;
