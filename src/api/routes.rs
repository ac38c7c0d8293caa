//! API route definitions

use super::handlers::{self, SynthesisState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: SynthesisState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Chart-type reference data
        .route("/api/chart-types", get(handlers::list_chart_types))
        // Relationship charts: get-or-create, and fan-out propagation
        .route("/api/charts", post(handlers::create_chart))
        .route("/api/charts/propagate", post(handlers::propagate_update))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
