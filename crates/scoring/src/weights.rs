//! Weights for the user-anchored score.

use serde::{Deserialize, Serialize};

/// Blend weights for [`crate::UserAffinityScorer`].
///
/// `vote_avg`, `popularity` and `count_log` scale the global quality and
/// popularity signals. `user_bias` and `mean_bias` only apply when a user
/// profile is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub vote_avg: f64,
    pub popularity: f64,
    pub count_log: f64,
    pub user_bias: f64,
    pub mean_bias: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            vote_avg: 0.15,
            popularity: 0.02,
            count_log: 0.5,
            user_bias: 1.0,
            mean_bias: 1.0,
        }
    }
}
