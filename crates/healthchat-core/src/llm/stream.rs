//! Streaming chat client.
//!
//! Reduces a provider's event stream to the text fragments the UI shows.
//! Events without text are skipped, the stream ends at the provider's
//! `Done` (or when the provider stream ends), and the first provider error
//! is yielded and terminates the stream. Nothing is retried.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};
use pin_project_lite::pin_project;
use tracing::{debug, info_span};

use healthchat_types::config::GenerationConfig;
use healthchat_types::llm::{LlmError, StreamEvent};

use crate::conversation::Conversation;

use super::provider::{LlmEventStream, LlmProvider};

/// Lazy, non-restartable sequence of generated text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>>;

/// Issue one streaming chat completion for `conversation`.
///
/// The request is sent when the returned stream is first polled. The whole
/// stream runs inside a `gen_ai.chat` span.
pub fn stream_completion<P>(
    provider: &P,
    conversation: Conversation,
    generation: &GenerationConfig,
) -> TextStream
where
    P: LlmProvider + ?Sized,
{
    let request = conversation.into_request(provider.model(), generation);

    let span = info_span!(
        "gen_ai.chat",
        gen_ai.operation.name = "chat",
        gen_ai.system = provider.name(),
        gen_ai.request.model = %request.model,
        gen_ai.request.max_tokens = request.max_tokens,
        gen_ai.request.temperature = ?request.temperature,
        gen_ai.request.stream = true,
    );

    let events = provider.stream(request);
    Box::pin(StreamInSpan::new(text_fragments(events), span))
}

/// Map provider events to non-empty text fragments.
pub fn text_fragments(events: LlmEventStream) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut events = events;
        let mut fragments: u32 = 0;

        while let Some(event) = events.next().await {
            match event {
                Ok(StreamEvent::TextDelta { text }) => {
                    if !text.is_empty() {
                        fragments += 1;
                        yield Ok(text);
                    }
                }
                Ok(StreamEvent::MessageDelta { stop_reason }) => {
                    debug!(%stop_reason, "Completion finished");
                }
                Ok(StreamEvent::Usage(usage)) => {
                    debug!(
                        gen_ai.usage.input_tokens = usage.input_tokens,
                        gen_ai.usage.output_tokens = usage.output_tokens,
                        "Token usage"
                    );
                }
                Ok(StreamEvent::Connected) => {}
                Ok(StreamEvent::Done) => break,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        debug!(fragments, "Stream complete");
    })
}

pin_project! {
    /// Keeps a tracing span entered whenever the wrapped stream is polled.
    pub struct StreamInSpan<S> {
        #[pin]
        inner: S,
        span: tracing::Span,
    }
}

impl<S> StreamInSpan<S> {
    pub fn new(inner: S, span: tracing::Span) -> Self {
        Self { inner, span }
    }
}

impl<S: Stream> Stream for StreamInSpan<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let _enter = this.span.enter();
        this.inner.poll_next(cx)
    }
}
