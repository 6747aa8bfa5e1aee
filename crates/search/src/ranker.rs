//! Title search ranker.
//!
//! ## Algorithm
//! 1. Lowercase and trim the query; a blank query matches nothing
//! 2. For each movie, lowercase its title with the year suffix stripped
//! 3. +3 if the title starts with the query, +1 if it contains it
//!    (a prefix match earns both)
//! 4. Drop movies that earned nothing, add `0.1 * ln(1 + rating_count)`
//! 5. Stable sort by descending score and keep the first `limit`
//!
//! This is filter-then-rank lexical matching, not fuzzy search.

use data_loader::{MovieId, MovieRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const PREFIX_BONUS: f64 = 3.0;
const SUBSTRING_BONUS: f64 = 1.0;
const POPULARITY_WEIGHT: f64 = 0.1;

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub movie_id: MovieId,
    pub title: String,
}

/// Ranks movie titles against a free-text query.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleSearchRanker;

impl TitleSearchRanker {
    pub fn new() -> Self {
        Self
    }

    /// Lexical score of `movie` for an already-normalised query.
    ///
    /// Returns `None` when the title does not match at all.
    pub fn score(&self, normalized_query: &str, movie: &MovieRecord) -> Option<f64> {
        let title = movie.title_without_year().to_lowercase();

        let mut score = 0.0;
        if title.starts_with(normalized_query) {
            score += PREFIX_BONUS;
        }
        if title.contains(normalized_query) {
            score += SUBSTRING_BONUS;
        }
        if score == 0.0 {
            return None;
        }

        Some(score + POPULARITY_WEIGHT * (movie.rating_count as f64).ln_1p())
    }

    /// Search `movies` for `query`, best matches first.
    ///
    /// Ties keep the order of `movies`.
    #[instrument(skip(self, movies), fields(candidates = movies.len()))]
    pub fn search(&self, movies: &[MovieRecord], query: &str, limit: usize) -> Vec<SearchHit> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&MovieRecord, f64)> = movies
            .iter()
            .filter_map(|movie| self.score(&normalized, movie).map(|score| (movie, score)))
            .collect();

        // sort_by is stable, equal scores stay in table order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        debug!("Search for {:?} matched {} titles", normalized, scored.len());

        scored
            .into_iter()
            .map(|(movie, _)| SearchHit {
                movie_id: movie.id,
                title: movie.title.clone(),
            })
            .collect()
    }
}

/// Trim and lowercase a raw query
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
