use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};

/// Maximum accepted request body (5MB).
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Builds the HTTP router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/collectchat", post(handlers::collectchat))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Enforced by the `Bytes` extractor; rejections become `AppError`
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
