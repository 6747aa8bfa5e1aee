//! User-anchored scoring.
//!
//! Blends a movie's global quality and popularity signals with a cheap
//! personalisation term: candidates whose historical mean rating is close to
//! the user's own mean are rewarded.
//!
//! ## Formula
//! ```text
//! score = rating_mean
//!       + w_vote  * tmdb_vote_avg
//!       + w_pop   * tmdb_popularity
//!       + w_count * ln(1 + rating_count)
//!       + [user known] w_userbias * user.rating_mean
//!                    - w_meanbias * |rating_mean - user.rating_mean|
//! ```

use crate::traits::Scorer;
use crate::weights::ScoreWeights;
use data_loader::{MovieRecord, UserProfileRecord};

/// Scores candidates for a (possibly unknown) user.
///
/// With no profile the personalisation terms are left out entirely, which
/// turns the ranking into a popularity/quality ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAffinityScorer {
    weights: ScoreWeights,
}

impl UserAffinityScorer {
    /// Create a scorer with the default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the blend weights
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Non-personalised part of the score
    pub fn base_score(&self, candidate: &MovieRecord) -> f64 {
        let w = &self.weights;
        candidate.rating_mean
            + w.vote_avg * candidate.tmdb_vote_avg
            + w.popularity * candidate.tmdb_popularity
            + w.count_log * (candidate.rating_count as f64).ln_1p()
    }

    /// Full score for `candidate`, personalised when `user` is known
    pub fn score_for(&self, candidate: &MovieRecord, user: Option<&UserProfileRecord>) -> f64 {
        let mut score = self.base_score(candidate);
        if let Some(user) = user {
            score += self.weights.user_bias * user.rating_mean;
            score -= self.weights.mean_bias * mean_gap(candidate, user);
        }
        score
    }
}

impl<'u> Scorer<Option<&'u UserProfileRecord>> for UserAffinityScorer {
    fn name(&self) -> &str {
        "UserAffinityScorer"
    }

    fn score(&self, candidate: &MovieRecord, user: &Option<&'u UserProfileRecord>) -> f64 {
        self.score_for(candidate, *user)
    }
}

/// Absolute difference between a movie's mean rating and a user's mean rating
pub fn mean_gap(candidate: &MovieRecord, user: &UserProfileRecord) -> f64 {
    (candidate.rating_mean - user.rating_mean).abs()
}
