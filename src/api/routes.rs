//! HTTP API route definitions.

use axum::routing::{get, put};
use axum::{middleware, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers::{
    details, echo, echo_put, forced_status, metrics_text, not_found, openapi, root, status, AppState,
};
use super::middleware::track_metrics;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Host metadata
        .route("/", get(root))
        .route("/details", get(details))
        // Status codes and echo
        .route("/status", get(status))
        .route("/status/:code", get(forced_status))
        .route("/echo", put(echo_put).post(echo))
        // Introspection
        .route("/metrics", get(metrics_text))
        .route("/openapi.json", get(openapi))
        .route_layer(middleware::from_fn(track_metrics))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
