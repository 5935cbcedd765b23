//! HTTP API route definitions.

use axum::{Router, routing::get};

use super::handlers::{self, AppState};

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/search", get(handlers::search))
        .route("/sync", get(handlers::sync))
        .with_state(state)
}
