pub mod health;

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;

use crate::render::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/generate-pdf", post(handlers::handle_generate_pdf))
        .route(
            "/api/generate-deedy-pdf",
            post(handlers::handle_generate_deedy_pdf),
        )
        .route(
            "/api/generate-resume",
            post(handlers::handle_generate_source).get(handlers::handle_generate_source_info),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// A panicking handler still answers with the standard error body.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "An internal server error occurred" })),
    )
        .into_response()
}
