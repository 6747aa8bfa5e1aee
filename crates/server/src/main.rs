//! ReelRank HTTP server.
//!
//! Loads the feature tables once, then serves `/health`, `/rank`, `/search`
//! and `/movie/{id}` until interrupted.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use data_loader::FeatureStore;
use server::{AppState, Config, RankingOrchestrator, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let data_dir = config.data_dir();

    info!("Loading feature store from {}", data_dir.display());
    let store = match FeatureStore::load_from_dir(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            warn!("Failed to load features from {}: {}", data_dir.display(), e);
            warn!("Starting with an empty store; /rank will answer 503");
            FeatureStore::empty()
        }
    };

    let (movies, users) = store.counts();
    let orchestrator = RankingOrchestrator::new(Arc::new(store))
        .with_weights(config.weights())
        .with_poster_base(config.poster_base_url.clone());
    let app = create_router(AppState::new(orchestrator));

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving {} movies / {} users on http://{}", movies, users, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
