//! OpenAI-compatible inference provider.
//!
//! A single [`OpenAiCompatibleProvider`] serves the Hugging Face inference
//! router and any other endpoint that speaks the chat completions protocol.
//!
//! Request and chunk shapes come from [`async_openai`]; the SSE connection
//! is driven by [`reqwest_eventsource`] so the HTTP status of a rejected
//! request is still known when the error is classified.

pub mod config;
pub mod streaming;

use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use reqwest::StatusCode;
use reqwest_eventsource::EventSource;
use reqwest_eventsource::retry::Never;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use healthchat_core::llm::provider::{LlmEventStream, LlmProvider};
use healthchat_types::llm::{CompletionRequest, LlmError, MessageRole, StreamEvent};

use self::config::OpenAiCompatConfig;
use self::streaming::{completion_chunks, map_openai_stream};

/// Provider for any OpenAI-compatible chat completions API.
#[derive(Debug)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    provider_name: String,
    completions_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a provider from a configuration.
    ///
    /// Fails only if the underlying HTTP client cannot be built.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        tracing::debug!(
            provider = %config.provider_name,
            base_url = %config.base_url,
            model = %config.model,
            "Created inference provider"
        );

        Ok(Self {
            client,
            provider_name: config.provider_name,
            completions_url: format!(
                "{}/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key,
            model: config.model,
        })
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let messages: Vec<ChatCompletionRequestMessage> = request
            .messages
            .iter()
            .map(|msg| match msg.role {
                MessageRole::System => {
                    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                                msg.content.clone(),
                            )),
                            refusal: None,
                            name: None,
                            audio: None,
                            tool_calls: None,
                            function_call: None,
                        },
                    )
                }
            })
            .collect();

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        // TGI-backed endpoints read `max_tokens`, not `max_completion_tokens`.
        #[allow(deprecated)]
        let mut req = CreateChatCompletionRequest {
            model,
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };

        if request.stream {
            req.stream = Some(true);
        }

        req
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn stream(&self, request: CompletionRequest) -> LlmEventStream {
        let mut oai_request = self.build_request(&request);
        oai_request.stream = Some(true);

        let builder = self
            .client
            .post(&self.completions_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&oai_request);

        match EventSource::new(builder) {
            Ok(mut source) => {
                source.set_retry_policy(Box::new(Never));
                map_openai_stream(completion_chunks(source))
            }
            Err(e) => Box::pin(futures_util::stream::once(async move {
                Err::<StreamEvent, _>(LlmError::Provider {
                    message: format!("failed to build streaming request: {e}"),
                })
            })),
        }
    }
}

/// Error body sent by OpenAI-compatible backends.
///
/// The Hugging Face router uses `{"error": "..."}`; OpenAI-style servers
/// use `{"error": {"message": "...", ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Object { message: String },
}

impl ErrorEnvelope {
    fn parse(body: &str) -> Option<String> {
        let envelope: Self = serde_json::from_str(body).ok()?;
        match envelope.error {
            ErrorDetail::Message(message) | ErrorDetail::Object { message } => Some(message),
        }
    }
}

fn is_model_loading(message: &str) -> bool {
    message.contains("is currently loading")
}

/// Classify a non-success HTTP response.
pub(crate) fn map_status_error(status: StatusCode, body: &str) -> LlmError {
    let message = ErrorEnvelope::parse(body).unwrap_or_else(|| body.trim().to_string());
    let message = if message.is_empty() {
        status.to_string()
    } else {
        message
    };

    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        // 402 is the router's "monthly credits exhausted"
        402 | 429 => LlmError::RateLimited,
        500..=599 => LlmError::Overloaded(message),
        _ if is_model_loading(&message) => LlmError::Overloaded(message),
        _ => LlmError::Provider {
            message: format!("HTTP {}: {message}", status.as_u16()),
        },
    }
}

/// Classify an error object sent in place of a chunk after the stream opened.
pub(crate) fn map_error_payload(data: &str) -> Option<LlmError> {
    let message = ErrorEnvelope::parse(data)?;
    Some(if is_model_loading(&message) {
        LlmError::Overloaded(message)
    } else {
        LlmError::Provider { message }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use healthchat_types::llm::Message;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

    fn provider_at(base_url: &str) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(OpenAiCompatConfig {
            provider_name: "huggingface".into(),
            base_url: base_url.into(),
            api_key: SecretString::from("hf_test"),
            model: MODEL.into(),
            request_timeout: std::time::Duration::from_secs(5),
        })
        .unwrap()
    }

    fn provider() -> OpenAiCompatibleProvider {
        provider_at("https://router.huggingface.co/v1")
    }

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages: vec![
                Message::system("You are a general health assistant."),
                Message::user("What are symptoms of dehydration?"),
            ],
            max_tokens: 200,
            temperature: Some(0.6),
            stream: true,
        }
    }

    /// Serve one canned HTTP response and hand back the raw request head.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: String,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Read the full request so closing the socket doesn't reset it.
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&request).to_string());

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{addr}/v1"), rx)
    }

    async fn stream_error(status: &'static str, body: &str) -> LlmError {
        let (base_url, _) = serve_once(status, "application/json", body.to_string()).await;
        let events: Vec<_> = provider_at(&base_url).stream(request("")).collect().await;
        assert!(
            events
                .iter()
                .all(|e| !matches!(e, Ok(StreamEvent::TextDelta { .. })))
        );
        match events.into_iter().last() {
            Some(Err(err)) => err,
            other => panic!("expected a terminal error, got {other:?}"),
        }
    }

    #[test]
    #[allow(deprecated)]
    fn test_build_request_messages() {
        let provider = provider();
        let oai_req = provider.build_request(&request(MODEL));

        assert_eq!(oai_req.model, MODEL);
        assert_eq!(oai_req.messages.len(), 2);
        assert!(matches!(
            &oai_req.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            &oai_req.messages[1],
            ChatCompletionRequestMessage::User(_)
        ));
        assert_eq!(oai_req.max_tokens, Some(200));
        assert!(oai_req.max_completion_tokens.is_none());
        assert_eq!(oai_req.temperature, Some(0.6));
        assert_eq!(oai_req.stream, Some(true));
        assert!(oai_req.stream_options.is_none());
    }

    #[test]
    fn test_build_request_serializes_wire_fields() {
        let provider = provider();
        let oai_req = provider.build_request(&request(MODEL));
        let json = serde_json::to_value(&oai_req).unwrap();

        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(
            json["messages"][1]["content"],
            "What are symptoms of dehydration?"
        );
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let provider = provider();
        let oai_req = provider.build_request(&request(""));
        assert_eq!(oai_req.model, MODEL);
    }

    #[test]
    fn test_completions_url_tolerates_trailing_slash() {
        assert_eq!(
            provider_at("http://localhost:8080/v1/").completions_url,
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_map_status_error_classes() {
        let router_body = r#"{"error":"Invalid username or password."}"#;
        assert!(matches!(
            map_status_error(StatusCode::UNAUTHORIZED, router_body),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            map_status_error(StatusCode::FORBIDDEN, ""),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            map_status_error(StatusCode::PAYMENT_REQUIRED, r#"{"error":"credits exhausted"}"#),
            LlmError::RateLimited
        ));
        assert!(matches!(
            map_status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            LlmError::RateLimited
        ));

        match map_status_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":{"message":"boom","type":"server_error"}}"#,
        ) {
            LlmError::Overloaded(message) => assert_eq!(message, "boom"),
            other => panic!("unexpected error: {other}"),
        }

        match map_status_error(StatusCode::SERVICE_UNAVAILABLE, "") {
            LlmError::Overloaded(message) => assert_eq!(message, "503 Service Unavailable"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_map_status_error_keeps_message() {
        match map_status_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"Model not supported by provider","type":"invalid_request_error"}}"#,
        ) {
            LlmError::Provider { message } => {
                assert_eq!(message, "HTTP 400: Model not supported by provider");
            }
            other => panic!("unexpected error: {other}"),
        }

        match map_status_error(StatusCode::BAD_REQUEST, "not json at all") {
            LlmError::Provider { message } => assert_eq!(message, "HTTP 400: not json at all"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_model_loading_is_overloaded() {
        let body = r#"{"error":"Model mistralai/Mistral-7B-Instruct-v0.2 is currently loading"}"#;
        assert!(matches!(
            map_status_error(StatusCode::BAD_REQUEST, body),
            LlmError::Overloaded(_)
        ));
        assert!(matches!(map_error_payload(body), Some(LlmError::Overloaded(_))));
    }

    #[test]
    fn test_map_error_payload_ignores_chunks() {
        assert!(map_error_payload(r#"{"id":"chatcmpl-1","choices":[]}"#).is_none());
        assert!(matches!(
            map_error_payload(r#"{"error":{"message":"Input validation error"}}"#),
            Some(LlmError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_stream_http_status_classification() {
        assert!(matches!(
            stream_error("401 Unauthorized", r#"{"error":"Invalid username or password."}"#).await,
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            stream_error("402 Payment Required", r#"{"error":"You have exceeded your monthly included credits."}"#).await,
            LlmError::RateLimited
        ));
        assert!(matches!(
            stream_error("429 Too Many Requests", r#"{"error":"Rate limit reached."}"#).await,
            LlmError::RateLimited
        ));
        assert!(matches!(
            stream_error("503 Service Unavailable", "Service Unavailable").await,
            LlmError::Overloaded(_)
        ));
        assert!(matches!(
            stream_error("500 Internal Server Error", r#"{"error":{"message":"boom"}}"#).await,
            LlmError::Overloaded(_)
        ));
    }

    #[tokio::test]
    async fn test_stream_success_sends_bearer_and_yields_text() {
        let chunk = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_700_000_000,
            "model": MODEL,
            "choices": [{
                "index": 0,
                "delta": {"role": "assistant", "content": "Drink water."},
                "finish_reason": "stop",
            }],
        });
        let body = format!("data: {chunk}\n\ndata: [DONE]\n\n");
        let (base_url, request_rx) = serve_once("200 OK", "text/event-stream", body).await;

        let events: Vec<StreamEvent> = provider_at(&base_url)
            .stream(request(""))
            .map(Result::unwrap)
            .collect()
            .await;

        assert!(events.contains(&StreamEvent::TextDelta {
            text: "Drink water.".into()
        }));
        assert_eq!(events.last(), Some(&StreamEvent::Done));

        let raw = request_rx.await.unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions "));
        assert!(raw.to_lowercase().contains("authorization: bearer hf_test"));
        assert!(raw.contains("\"stream\":true"));
    }

    #[tokio::test]
    async fn test_stream_unreachable_backend_yields_single_error() {
        // Port 9 (discard) on loopback is not expected to accept connections.
        let provider = provider_at("http://127.0.0.1:9/v1");

        let events: Vec<_> = provider.stream(request("")).collect().await;
        assert!(!events.is_empty());
        assert!(events.last().unwrap().is_err());
        assert_eq!(events.iter().filter(|e| e.is_err()).count(), 1);
    }
}
