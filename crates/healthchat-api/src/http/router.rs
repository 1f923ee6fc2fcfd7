//! Axum router configuration with middleware.
//!
//! `/` serves the embedded single-page UI; API routes live under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::response::Html;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("assets/index.html");

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/sessions", post(handlers::session::create_session))
        .route("/sessions/{id}", delete(handlers::session::delete_session))
        .route(
            "/sessions/{id}/transcript",
            get(handlers::session::get_transcript),
        )
        .route("/sessions/{id}/ask", post(handlers::chat::ask));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - The chat page.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health - Liveness check.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
