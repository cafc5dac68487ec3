//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{request_id_middleware, RequestId};
use crate::state::AppState;

/// Setup all application routes
///
/// `/upload` reads at most `UploadConfig::body_limit()` bytes of body. Methods a
/// route does not serve get 405.
pub fn setup_routes(state: Arc<AppState>) -> Router {
    let body_limit = state.config.body_limit();

    Router::new()
        .route(
            "/",
            get(handlers::index::index).fallback(handlers::method_not_allowed),
        )
        .route(
            "/upload",
            post(handlers::upload::upload)
                .fallback(handlers::method_not_allowed)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/health", get(handlers::health::liveness_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        // Outermost so the trace span can see the request ID
        .layer(middleware::from_fn(request_id_middleware))
}

fn make_request_span(request: &Request) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.as_str())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
