//! HTTP boundary: axum router, handlers and shared state.
//!
//! Handlers only decode, call the orchestrator and encode. Every error is a
//! [`crate::RankError`] and is rendered by its `IntoResponse` impl.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
