//! API Routes
//!
//! Configures the Axum router with all viewport cache endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    filters_handler, health_handler, markers_handler, places_handler, retry_handler,
    stats_handler, viewport_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin so a browser map can call the API directly
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/viewport", post(viewport_handler))
        .route("/filters", put(filters_handler))
        .route("/retry", post(retry_handler))
        .route("/places", get(places_handler))
        .route("/markers", get(markers_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
