//! Server crate for the ReelRank ranking service.
//!
//! - **orchestrator**: validates requests and runs the scoring and search passes
//! - **http**: axum router and handlers over the orchestrator
//! - **config**: environment-driven settings
//! - **error**: request-time error taxonomy

pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;

pub use config::Config;
pub use error::{RankError, RankResult};
pub use http::{AppState, create_router};
pub use orchestrator::{
    Anchor, DEFAULT_K, DEFAULT_POSTER_BASE, DEFAULT_SEARCH_LIMIT, RankRequest, RankResponse,
    RankedResult, RankingOrchestrator, ReasonTag,
};
