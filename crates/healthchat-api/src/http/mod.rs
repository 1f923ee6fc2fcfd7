//! HTTP layer for HealthChat.
//!
//! Axum-based web UI at `/` and JSON/SSE API at `/api/v1/`, with envelope
//! response format and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
