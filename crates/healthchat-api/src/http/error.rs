//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use healthchat_types::error::ChatError;
use healthchat_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// No live session with the requested id.
    SessionNotFound,
    /// Validation error.
    Validation(String),
}

/// Machine-readable code for a chat failure, sent in SSE `error` events.
pub fn chat_error_code(err: &ChatError) -> &'static str {
    match err {
        ChatError::InvalidInput(_) => "VALIDATION_ERROR",
        ChatError::Inference(LlmError::AuthenticationFailed) => "BACKEND_AUTH_FAILED",
        ChatError::Inference(LlmError::RateLimited) => "BACKEND_RATE_LIMITED",
        ChatError::Inference(LlmError::Overloaded(_)) => "BACKEND_OVERLOADED",
        ChatError::Inference(_) => "INFERENCE_ERROR",
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "data": null,
            "meta": {
                "request_id": uuid::Uuid::now_v7().to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
