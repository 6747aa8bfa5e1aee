//! Seed-anchored ("more like this") scoring.
//!
//! ## Algorithm
//! ```text
//! score = 2.0 * genre_jaccard(seed, c)
//!       + 1.0 - |seed.rating_mean - c.rating_mean| / 5.0
//!       + [both vote averages > 0] 0.8 - |seed.vote - c.vote| / 10.0
//!       + 0.15 * ln(1 + c.rating_count)
//! ```
//! Genre overlap carries the largest weight: similarity is mostly about
//! content, ratings only separate movies within a genre neighbourhood.

use crate::genres::{genre_set, jaccard};
use crate::traits::Scorer;
use data_loader::MovieRecord;
use std::collections::HashSet;

const GENRE_WEIGHT: f64 = 2.0;
const RATING_SCALE: f64 = 5.0;
const VOTE_BONUS: f64 = 0.8;
const VOTE_SCALE: f64 = 10.0;
const COUNT_WEIGHT: f64 = 0.15;

/// The seed movie of a similarity request, with its genre set parsed once
/// per request instead of once per candidate.
#[derive(Debug, Clone)]
pub struct SeedMovie<'a> {
    pub movie: &'a MovieRecord,
    genres: HashSet<String>,
}

impl<'a> SeedMovie<'a> {
    pub fn new(movie: &'a MovieRecord) -> Self {
        Self {
            movie,
            genres: genre_set(movie),
        }
    }

    /// Genre Jaccard between the seed and `candidate`
    pub fn genre_similarity(&self, candidate: &MovieRecord) -> f64 {
        jaccard(&self.genres, &genre_set(candidate))
    }

    /// Absolute difference of mean ratings
    pub fn rating_gap(&self, candidate: &MovieRecord) -> f64 {
        (self.movie.rating_mean - candidate.rating_mean).abs()
    }
}

/// Scores candidates by similarity to a seed movie.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_for(&self, seed: &SeedMovie<'_>, candidate: &MovieRecord) -> f64 {
        let mut score = GENRE_WEIGHT * seed.genre_similarity(candidate);
        score += 1.0 - seed.rating_gap(candidate) / RATING_SCALE;

        let seed_vote = seed.movie.tmdb_vote_avg;
        if seed_vote > 0.0 && candidate.tmdb_vote_avg > 0.0 {
            score += VOTE_BONUS - (seed_vote - candidate.tmdb_vote_avg).abs() / VOTE_SCALE;
        }

        score += COUNT_WEIGHT * (candidate.rating_count as f64).ln_1p();
        score
    }
}

impl<'a> Scorer<SeedMovie<'a>> for SimilarityScorer {
    fn name(&self) -> &str {
        "SimilarityScorer"
    }

    fn score(&self, candidate: &MovieRecord, seed: &SeedMovie<'a>) -> f64 {
        self.score_for(seed, candidate)
    }
}
