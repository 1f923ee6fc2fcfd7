//! Infrastructure implementations for HealthChat.
//!
//! Implements the ports defined in `healthchat-core` against real systems:
//! the OpenAI-compatible Hugging Face inference router, the process
//! environment for credentials, and TOML files for configuration and the
//! prompt bundle.

pub mod config;
pub mod llm;
pub mod prompt;
pub mod secret;
