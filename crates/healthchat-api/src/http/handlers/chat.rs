//! SSE streaming ask endpoint.
//!
//! POST /api/v1/sessions/{id}/ask
//!
//! Streams the answer as Server-Sent Events. The exchange is appended to the
//! session transcript once the stream completes without error.
//!
//! SSE event types:
//! - `fragment` -- incremental text: `{ "text": "..." }`
//! - `error` -- answer failed: `{ "code": "...", "message": "..." }`
//! - `done` -- stream complete: `{}`

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;

use crate::http::error::{AppError, chat_error_code};
use crate::http::handlers::session::parse_uuid;
use crate::state::AppState;

/// Request body for the ask endpoint.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// POST /api/v1/sessions/{id}/ask -- SSE streaming answer.
pub async fn ask(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AskRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let session_id = parse_uuid(&id)?;
    let transcript = state
        .session(&session_id)
        .ok_or(AppError::SessionNotFound)?;

    if body.question.trim().is_empty() {
        return Err(AppError::Validation("Please enter a question.".to_string()));
    }

    let mut fragments = state
        .chat_service
        .ask_in_session(transcript, body.question);

    let sse_stream = async_stream::stream! {
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(text) => {
                    let data = serde_json::json!({ "text": text });
                    yield Ok::<_, Infallible>(Event::default().event("fragment").data(data.to_string()));
                }
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Answer failed");
                    let data = serde_json::json!({
                        "code": chat_error_code(&e),
                        "message": e.to_string(),
                    });
                    yield Ok(Event::default().event("error").data(data.to_string()));
                    break;
                }
            }
        }

        yield Ok(Event::default().event("done").data("{}"));
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
