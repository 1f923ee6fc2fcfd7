//! LlmProvider trait definition.
//!
//! The only call HealthChat makes to a backend is a streaming chat
//! completion, so the trait is a single object-safe `stream` method plus
//! identification for logs and spans.

use std::pin::Pin;

use futures_util::Stream;

use healthchat_types::llm::{CompletionRequest, LlmError, StreamEvent};

/// Boxed stream of provider events, owned by the caller.
pub type LlmEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Trait for inference backends (Hugging Face router, other OpenAI-compatible APIs).
///
/// Implementations live in healthchat-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "huggingface").
    fn name(&self) -> &str;

    /// Model used when a request leaves `model` empty.
    fn model(&self) -> &str;

    /// Send a streaming completion request.
    ///
    /// Must not perform I/O until the returned stream is first polled. Each
    /// call results in at most one outbound request.
    fn stream(&self, request: CompletionRequest) -> LlmEventStream;
}
