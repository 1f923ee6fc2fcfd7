//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions                 - Create a session
//! - GET    /api/v1/sessions/{id}/transcript - Get a session's transcript
//! - DELETE /api/v1/sessions/{id}            - Discard a session

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use healthchat_types::chat::TranscriptEntry;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of a session creation response.
#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// Body of a transcript response.
#[derive(Debug, Serialize)]
pub struct TranscriptView {
    pub session_id: Uuid,
    pub exchanges: usize,
    pub entries: Vec<TranscriptEntry>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid session id: {s}")))
}

/// POST /api/v1/sessions - Create a new, empty session.
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<SessionCreated>>) {
    let start = Instant::now();
    let session_id = state.create_session();
    tracing::info!(session_id = %session_id, "Session created");

    let response = ApiResponse::success(
        SessionCreated { session_id },
        Uuid::now_v7().to_string(),
        start.elapsed().as_millis() as u64,
    )
    .with_link("ask", &format!("/api/v1/sessions/{session_id}/ask"))
    .with_link(
        "transcript",
        &format!("/api/v1/sessions/{session_id}/transcript"),
    );

    (StatusCode::CREATED, Json(response))
}

/// GET /api/v1/sessions/{id}/transcript - Completed exchanges, oldest first.
///
/// Waits for any in-flight answer in the same session to finish.
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TranscriptView>>, AppError> {
    let start = Instant::now();
    let session_id = parse_uuid(&id)?;
    let transcript = state
        .session(&session_id)
        .ok_or(AppError::SessionNotFound)?;

    let transcript = transcript.lock().await;
    let view = TranscriptView {
        session_id,
        exchanges: transcript.exchange_count(),
        entries: transcript.entries().to_vec(),
    };

    Ok(Json(ApiResponse::success(
        view,
        Uuid::now_v7().to_string(),
        start.elapsed().as_millis() as u64,
    )))
}

/// DELETE /api/v1/sessions/{id} - Discard a session and its transcript.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let session_id = parse_uuid(&id)?;

    if !state.remove_session(&session_id) {
        return Err(AppError::SessionNotFound);
    }
    tracing::info!(session_id = %session_id, "Session deleted");

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true }),
        Uuid::now_v7().to_string(),
        start.elapsed().as_millis() as u64,
    )))
}
