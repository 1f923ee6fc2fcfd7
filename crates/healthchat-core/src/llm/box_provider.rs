//! BoxLlmProvider -- type-erased wrapper for LlmProvider.
//!
//! `LlmProvider` is object-safe, so the wrapper is a plain `Box<dyn _>`
//! delegate. UI drivers hold a `ChatService<BoxLlmProvider>` so the HTTP
//! and terminal layers don't carry the concrete provider type.

use healthchat_types::llm::CompletionRequest;

use super::provider::{LlmEventStream, LlmProvider};

/// Owned, type-erased [`LlmProvider`].
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProvider>,
}

impl BoxLlmProvider {
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }
}

impl LlmProvider for BoxLlmProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn stream(&self, request: CompletionRequest) -> LlmEventStream {
        self.inner.stream(request)
    }
}
