use crate::api::{handlers, AppState};
use axum::{routing::post, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

/// Path of the only route
pub const PREDICT_INTENT_PATH: &str = "/predict-intent";

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(PREDICT_INTENT_PATH, post(handlers::predict_intent))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
}
