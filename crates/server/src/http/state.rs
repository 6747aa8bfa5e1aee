use std::sync::Arc;

use data_loader::FeatureStore;

use crate::orchestrator::RankingOrchestrator;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub orchestrator: Arc<RankingOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: RankingOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// State over an empty store, used when features failed to load
    pub fn empty() -> Self {
        Self::new(RankingOrchestrator::new(Arc::new(FeatureStore::empty())))
    }
}
