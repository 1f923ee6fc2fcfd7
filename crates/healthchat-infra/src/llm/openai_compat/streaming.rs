//! OpenAI SSE stream to [`StreamEvent`] adapter.
//!
//! [`completion_chunks`] turns the raw event source into typed
//! `chat.completion.chunk` payloads; [`map_openai_stream`] maps those to the
//! provider-agnostic [`StreamEvent`] enum defined in `healthchat-types`.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use reqwest_eventsource::{Event, EventSource};

use async_openai::types::chat::{CreateChatCompletionStreamResponse, FinishReason};

use healthchat_core::llm::provider::LlmEventStream;
use healthchat_types::llm::{LlmError, StopReason, StreamEvent, Usage};

use super::{map_error_payload, map_status_error};

/// Typed completion chunks, or the error that ended the stream.
pub type ChunkStream =
    Pin<Box<dyn Stream<Item = Result<CreateChatCompletionStreamResponse, LlmError>> + Send>>;

/// Read `chat.completion.chunk` payloads from an SSE connection.
///
/// Ends at the `[DONE]` sentinel or when the server closes the stream.
/// The first error (HTTP status, transport, malformed chunk or an error
/// object in place of a chunk) is yielded once and closes the connection.
pub fn completion_chunks(mut source: EventSource) -> ChunkStream {
    Box::pin(async_stream::stream! {
        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => tracing::debug!("Inference stream opened"),
                Ok(Event::Message(message)) => {
                    if message.data == "[DONE]" {
                        break;
                    }
                    match serde_json::from_str::<CreateChatCompletionStreamResponse>(&message.data) {
                        Ok(chunk) => yield Ok(chunk),
                        Err(e) => {
                            yield Err(map_error_payload(&message.data).unwrap_or_else(|| {
                                LlmError::Deserialization(format!(
                                    "failed to parse chunk: {e}: {}",
                                    message.data
                                ))
                            }));
                            break;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(e) => {
                    yield Err(map_eventsource_error(e).await);
                    break;
                }
            }
        }
        source.close();
    })
}

async fn map_eventsource_error(err: reqwest_eventsource::Error) -> LlmError {
    use reqwest_eventsource::Error;

    match err {
        Error::InvalidStatusCode(status, response) => {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Inference API error response");
            map_status_error(status, &body)
        }
        Error::InvalidContentType(content_type, _) => LlmError::Provider {
            message: format!("unexpected content type: {content_type:?}"),
        },
        Error::Transport(e) if e.is_timeout() => {
            LlmError::Stream(format!("request timed out: {e}"))
        }
        Error::Transport(e) if e.is_connect() => LlmError::Provider {
            message: format!("HTTP request failed: {e}"),
        },
        other => LlmError::Stream(other.to_string()),
    }
}

/// Map completion chunks to a stream of [`StreamEvent`]s.
///
/// The returned stream emits events in this order:
/// 1. `Connected` on entry
/// 2. `TextDelta` for each non-empty content chunk
/// 3. `MessageDelta` with the stop reason when `finish_reason` appears
/// 4. `Usage` if the backend reports it
/// 5. `Done` at the end of the stream
///
/// A chunk error is yielded once and ends the stream without `Done`.
pub fn map_openai_stream(chunks: ChunkStream) -> LlmEventStream {
    Box::pin(async_stream::stream! {
        yield Ok(StreamEvent::Connected);

        let mut chunks = chunks;

        while let Some(result) = chunks.next().await {
            let chunk = match result {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            for choice in chunk.choices {
                // Role-only and keep-alive chunks carry no content.
                if let Some(text) = choice.delta.content {
                    if !text.is_empty() {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                }

                if let Some(finish_reason) = choice.finish_reason {
                    yield Ok(StreamEvent::MessageDelta {
                        stop_reason: stop_reason(finish_reason),
                    });
                }
            }

            if let Some(usage) = chunk.usage {
                yield Ok(StreamEvent::Usage(Usage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                }));
            }
        }

        yield Ok(StreamEvent::Done);
    })
}

fn stop_reason(finish_reason: FinishReason) -> StopReason {
    match finish_reason {
        FinishReason::Stop => StopReason::EndTurn,
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ContentFilter => StopReason::ContentFilter,
        FinishReason::ToolCalls => StopReason::ToolUse,
        FinishReason::FunctionCall => StopReason::ToolUse,
    }
}
