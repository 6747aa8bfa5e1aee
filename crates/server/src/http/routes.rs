use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::AppState;
use super::handlers;

/// Creates the API router with all routes, CORS and request tracing
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/rank", post(handlers::rank))
        .route("/search", get(handlers::search))
        .route("/movie/:id", get(handlers::get_movie))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
