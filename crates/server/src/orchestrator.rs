//! # Ranking Orchestrator
//!
//! This module turns one ranking request into an ordered, capped result
//! list:
//! 1. Validate the request (exactly one anchor, normalise k)
//! 2. Resolve the anchor (seed movie must exist, unknown users degrade)
//! 3. Score every candidate with the scorer matching the anchor
//! 4. Sort by descending score (stable, so ties keep table order)
//! 5. Truncate to k
//! 6. Attach reason tags and poster URLs
//!
//! The orchestrator holds an `Arc<FeatureStore>` and never mutates it, so a
//! single instance is cloned into every request handler.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use data_loader::{FeatureStore, MovieId, MovieRecord, UserId, UserProfileRecord};
use scoring::{ScoreWeights, Scorer, SeedMovie, SimilarityScorer, UserAffinityScorer, mean_gap};
use search::{SearchHit, TitleSearchRanker};

use crate::error::{RankError, RankResult};

/// Result count used when a request gives no usable `k`
pub const DEFAULT_K: usize = 25;

/// Result count used when a search gives no usable `limit`
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Base URL poster paths are appended to
pub const DEFAULT_POSTER_BASE: &str = "https://image.tmdb.org/t/p/w342";

// Reason tag thresholds
const HIGH_VOTE_AVG: f64 = 7.5;
const POPULAR_RATING_COUNT: u32 = 1000;
const TASTE_MATCH_MAX_GAP: f64 = 0.5;
// One shared genre out of three distinct ones already counts as similar
const SIMILAR_GENRES_MIN: f64 = 1.0 / 3.0;
const SIMILAR_RATINGS_MAX_GAP: f64 = 0.3;

// =============================================================================
// Request / response types
// =============================================================================

/// Short label explaining why a result was included.
///
/// Attached after scoring; never feeds back into the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonTag {
    HighVoteAvg,
    PopularInMovielens,
    MatchesUserTaste,
    SimilarGenres,
    SimilarRatings,
}

impl ReasonTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonTag::HighVoteAvg => "high_vote_avg",
            ReasonTag::PopularInMovielens => "popular_in_movielens",
            ReasonTag::MatchesUserTaste => "matches_user_taste",
            ReasonTag::SimilarGenres => "similar_genres",
            ReasonTag::SimilarRatings => "similar_ratings",
        }
    }
}

impl fmt::Display for ReasonTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a ranking request is anchored on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    User(UserId),
    Movie(MovieId),
}

/// Incoming ranking request, exactly as decoded from the wire.
///
/// Ids are kept signed here so that zero or negative values reach
/// [`RankRequest::resolve`] and are rejected with a clear message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub movie_id: Option<i64>,
    #[serde(default)]
    pub k: Option<i64>,
}

impl RankRequest {
    pub fn for_user(user_id: UserId, k: usize) -> Self {
        Self {
            user_id: Some(user_id.into()),
            movie_id: None,
            k: i64::try_from(k).ok(),
        }
    }

    pub fn for_movie(movie_id: MovieId, k: usize) -> Self {
        Self {
            user_id: None,
            movie_id: Some(movie_id.into()),
            k: i64::try_from(k).ok(),
        }
    }

    /// Validate the request into an anchor and a result count.
    ///
    /// Exactly one of `user_id` / `movie_id` must be present and positive.
    /// A missing or non-positive `k` becomes [`DEFAULT_K`].
    pub fn resolve(&self) -> RankResult<(Anchor, usize)> {
        let anchor = match (self.user_id, self.movie_id) {
            (Some(_), Some(_)) => {
                return Err(RankError::InvalidRequest(
                    "provide either user_id or movie_id, not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(RankError::InvalidRequest(
                    "user_id or movie_id required".to_string(),
                ));
            }
            (Some(user_id), None) => Anchor::User(positive_id(user_id, "user_id")?),
            (None, Some(movie_id)) => Anchor::Movie(positive_id(movie_id, "movie_id")?),
        };
        Ok((anchor, normalize_count(self.k, DEFAULT_K)))
    }
}

/// Convert a wire id into a store id, rejecting zero, negatives and overflow
fn positive_id(value: i64, field: &str) -> RankResult<u32> {
    if value <= 0 {
        return Err(RankError::InvalidRequest(format!(
            "{field} must be a positive integer"
        )));
    }
    u32::try_from(value)
        .map_err(|_| RankError::InvalidRequest(format!("{field} {value} is out of range")))
}

/// Replace a missing or non-positive count with `default`
pub fn normalize_count(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => default,
    }
}

/// One ranked movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub movie_id: MovieId,
    pub score: f64,
    pub title: String,
    pub poster_url: String,
    pub reasons: Vec<ReasonTag>,
}

/// Ranking response; only the anchor that was used is echoed back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<MovieId>,
    pub results: Vec<RankedResult>,
    pub latency_ms: u64,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Coordinates scoring, sorting and annotation over the feature store
#[derive(Debug, Clone)]
pub struct RankingOrchestrator {
    store: Arc<FeatureStore>,
    user_scorer: UserAffinityScorer,
    similarity_scorer: SimilarityScorer,
    search_ranker: TitleSearchRanker,
    poster_base: String,
}

impl RankingOrchestrator {
    /// Create an orchestrator over a loaded store with default weights
    pub fn new(store: Arc<FeatureStore>) -> Self {
        Self {
            store,
            user_scorer: UserAffinityScorer::new(),
            similarity_scorer: SimilarityScorer::new(),
            search_ranker: TitleSearchRanker::new(),
            poster_base: DEFAULT_POSTER_BASE.to_string(),
        }
    }

    /// Configure the user-anchored blend weights
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.user_scorer = self.user_scorer.with_weights(weights);
        self
    }

    /// Configure the base URL for poster links
    pub fn with_poster_base(mut self, poster_base: impl Into<String>) -> Self {
        self.poster_base = poster_base.into();
        self
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    /// Main entry point: validate, rank and time one request
    #[instrument(skip(self))]
    pub fn rank(&self, request: &RankRequest) -> RankResult<RankResponse> {
        let start = Instant::now();

        if self.store.is_empty() {
            return Err(RankError::Unavailable("no data loaded".to_string()));
        }

        let (anchor, k) = request.resolve()?;
        let mut response = RankResponse {
            user_id: None,
            movie_id: None,
            results: Vec::new(),
            latency_ms: 0,
        };

        match anchor {
            Anchor::User(user_id) => {
                response.results = self.rank_for_user(user_id, k);
                response.user_id = Some(user_id);
            }
            Anchor::Movie(movie_id) => {
                response.results = self.rank_similar(movie_id, k)?;
                response.movie_id = Some(movie_id);
            }
        }

        let elapsed = start.elapsed();
        response.latency_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        info!(
            "Ranked {} results for {:?} in {:.2?}",
            response.results.len(),
            anchor,
            elapsed
        );
        Ok(response)
    }

    /// Personalised ranking for a user.
    ///
    /// An unknown user is not an error: the personalisation terms are
    /// dropped and the result is a popularity ranking.
    pub fn rank_for_user(&self, user_id: UserId, k: usize) -> Vec<RankedResult> {
        let user = self.store.get_user(user_id);
        if user.is_none() {
            debug!("User {} not found, using popularity-only ranking", user_id);
        }

        self.rank_and_select(&self.user_scorer, &user, None, k, |movie| {
            user_reasons(movie, user)
        })
    }

    /// Movies similar to a seed movie, never including the seed itself
    pub fn rank_similar(&self, movie_id: MovieId, k: usize) -> RankResult<Vec<RankedResult>> {
        let seed_movie = self
            .store
            .get_movie(movie_id)
            .ok_or_else(|| RankError::NotFound(format!("movie {} not found", movie_id)))?;
        let seed = SeedMovie::new(seed_movie);

        Ok(self.rank_and_select(&self.similarity_scorer, &seed, Some(movie_id), k, |movie| {
            similarity_reasons(&seed, movie)
        }))
    }

    /// Title search; a `limit` of 0 means the default limit
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let limit = if limit == 0 { DEFAULT_SEARCH_LIMIT } else { limit };
        self.search_ranker.search(self.store.movies(), query, limit)
    }

    /// Detail lookup
    pub fn movie(&self, movie_id: MovieId) -> RankResult<&MovieRecord> {
        self.store
            .get_movie(movie_id)
            .ok_or_else(|| RankError::NotFound(format!("movie {} not found", movie_id)))
    }

    /// Score the full candidate set, sort, truncate and annotate
    fn rank_and_select<C, S, R>(
        &self,
        scorer: &S,
        context: &C,
        exclude: Option<MovieId>,
        k: usize,
        reasons: R,
    ) -> Vec<RankedResult>
    where
        C: ?Sized,
        S: Scorer<C>,
        R: Fn(&MovieRecord) -> Vec<ReasonTag>,
    {
        let mut scored: Vec<(&MovieRecord, f64)> = self
            .store
            .movies()
            .iter()
            .filter(|movie| Some(movie.id) != exclude)
            .map(|movie| (movie, scorer.score(movie, context)))
            .collect();

        let candidates = scored.len();

        // Sort by score DESC; sort_by is stable so exact ties keep table order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        debug!(
            "{} scored {} candidates, kept {}",
            scorer.name(),
            candidates,
            scored.len()
        );

        scored
            .into_iter()
            .map(|(movie, score)| RankedResult {
                movie_id: movie.id,
                score,
                title: movie.title.clone(),
                poster_url: self.poster_url(movie),
                reasons: reasons(movie),
            })
            .collect()
    }

    /// Poster base + stored path, or empty when the movie has no poster
    fn poster_url(&self, movie: &MovieRecord) -> String {
        if movie.has_poster() {
            format!("{}{}", self.poster_base, movie.tmdb_poster_path)
        } else {
            String::new()
        }
    }
}

/// Reason tags for a user-anchored result
fn user_reasons(movie: &MovieRecord, user: Option<&UserProfileRecord>) -> Vec<ReasonTag> {
    let mut reasons = Vec::new();
    if movie.tmdb_vote_avg >= HIGH_VOTE_AVG {
        reasons.push(ReasonTag::HighVoteAvg);
    }
    if movie.rating_count >= POPULAR_RATING_COUNT {
        reasons.push(ReasonTag::PopularInMovielens);
    }
    if let Some(user) = user {
        if mean_gap(movie, user) <= TASTE_MATCH_MAX_GAP {
            reasons.push(ReasonTag::MatchesUserTaste);
        }
    }
    reasons
}

/// Reason tags for a seed-anchored result
fn similarity_reasons(seed: &SeedMovie<'_>, movie: &MovieRecord) -> Vec<ReasonTag> {
    let mut reasons = Vec::new();
    if seed.genre_similarity(movie) >= SIMILAR_GENRES_MIN {
        reasons.push(ReasonTag::SimilarGenres);
    }
    if seed.rating_gap(movie) <= SIMILAR_RATINGS_MAX_GAP {
        reasons.push(ReasonTag::SimilarRatings);
    }
    if movie.rating_count >= POPULAR_RATING_COUNT {
        reasons.push(ReasonTag::PopularInMovielens);
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn movie(id: MovieId, title: &str, genres: &str, mean: f64, count: u32, vote: f64) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            genres: genres.to_string(),
            rating_mean: mean,
            rating_count: count,
            tmdb_vote_avg: vote,
            ..Default::default()
        }
    }

    /// Create a small store with a few movies and users
    fn build_test_store() -> Arc<FeatureStore> {
        let mut matrix = movie(3, "Matrix, The (1999)", "Action|Sci-Fi", 4.2, 2500, 8.2);
        matrix.tmdb_poster_path = "/matrix.jpg".to_string();

        let movies = vec![
            movie(1, "Fight Club (1999)", "Drama|Thriller", 4.2, 1500, 8.4),
            movie(2, "Se7en (1995)", "Drama|Mystery", 4.0, 1200, 8.1),
            matrix,
            movie(4, "Toy Story (1995)", "Animation|Children's|Comedy", 3.9, 900, 7.9),
            movie(5, "Gigli (2003)", "Comedy|Romance", 1.4, 40, 3.5),
        ];
        let users = vec![
            UserProfileRecord { id: 1, rating_mean: 4.1, rating_count: 300 },
            UserProfileRecord { id: 2, rating_mean: 1.5, rating_count: 12 },
        ];
        Arc::new(FeatureStore::from_records(movies, users).expect("valid fixture"))
    }

    fn build_test_orchestrator() -> RankingOrchestrator {
        RankingOrchestrator::new(build_test_store())
    }

    fn assert_sorted(results: &[RankedResult]) {
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score, "results must be non-increasing");
        }
    }

    // ============================================================================
    // Unit Tests: request validation
    // ============================================================================

    #[test]
    fn test_resolve_requires_exactly_one_anchor() {
        let neither = RankRequest::default();
        assert!(matches!(neither.resolve(), Err(RankError::InvalidRequest(_))));

        let both = RankRequest { user_id: Some(1), movie_id: Some(1), k: None };
        assert!(matches!(both.resolve(), Err(RankError::InvalidRequest(_))));
    }

    #[test]
    fn test_resolve_rejects_non_positive_ids() {
        let zero = RankRequest { user_id: Some(0), ..Default::default() };
        assert!(matches!(zero.resolve(), Err(RankError::InvalidRequest(_))));

        let negative = RankRequest { movie_id: Some(-4), ..Default::default() };
        assert!(matches!(negative.resolve(), Err(RankError::InvalidRequest(_))));

        let huge = RankRequest { movie_id: Some(i64::MAX), ..Default::default() };
        assert!(matches!(huge.resolve(), Err(RankError::InvalidRequest(_))));
    }

    #[test]
    fn test_resolve_normalizes_k() {
        let missing = RankRequest { user_id: Some(3), ..Default::default() };
        assert_eq!(missing.resolve().unwrap(), (Anchor::User(3), DEFAULT_K));

        let negative = RankRequest { movie_id: Some(3), k: Some(-1), ..Default::default() };
        assert_eq!(negative.resolve().unwrap(), (Anchor::Movie(3), DEFAULT_K));

        let explicit = RankRequest::for_user(3, 7);
        assert_eq!(explicit.resolve().unwrap(), (Anchor::User(3), 7));
    }

    // ============================================================================
    // Unit Tests: rank_and_select
    // ============================================================================

    #[test]
    fn test_rank_returns_exactly_k_or_all() {
        let orchestrator = build_test_orchestrator();

        for k in 1..=5 {
            assert_eq!(orchestrator.rank_for_user(1, k).len(), k);
        }
        assert_eq!(orchestrator.rank_for_user(1, 50).len(), 5);

        // the seed is not a candidate
        assert_eq!(orchestrator.rank_similar(1, 50).unwrap().len(), 4);
    }

    #[test]
    fn test_results_sorted_by_score_descending() {
        let orchestrator = build_test_orchestrator();
        assert_sorted(&orchestrator.rank_for_user(1, 10));
        assert_sorted(&orchestrator.rank_for_user(999, 10));
        assert_sorted(&orchestrator.rank_similar(4, 10).unwrap());
    }

    #[test]
    fn test_similar_never_includes_seed() {
        let orchestrator = build_test_orchestrator();
        for seed in 1..=5 {
            let results = orchestrator.rank_similar(seed, 10).unwrap();
            assert!(results.iter().all(|r| r.movie_id != seed));
        }
    }

    #[test]
    fn test_similar_unknown_seed_is_not_found() {
        let orchestrator = build_test_orchestrator();
        assert!(matches!(
            orchestrator.rank_similar(404, 10),
            Err(RankError::NotFound(_))
        ));
    }

    #[test]
    fn test_unknown_user_falls_back_to_popularity() {
        let orchestrator = build_test_orchestrator();
        let results = orchestrator.rank_for_user(999, 5);

        assert_eq!(results.len(), 5);
        assert!(results
            .iter()
            .all(|r| !r.reasons.contains(&ReasonTag::MatchesUserTaste)));
        // Gigli has the weakest popularity signal
        assert_eq!(results.last().unwrap().movie_id, 5);
    }

    #[test]
    fn test_user_reason_tags() {
        let orchestrator = build_test_orchestrator();
        let results = orchestrator.rank_for_user(1, 5);

        let fight_club = results.iter().find(|r| r.movie_id == 1).unwrap();
        assert_eq!(
            fight_club.reasons,
            vec![
                ReasonTag::HighVoteAvg,
                ReasonTag::PopularInMovielens,
                ReasonTag::MatchesUserTaste
            ]
        );

        let gigli = results.iter().find(|r| r.movie_id == 5).unwrap();
        assert!(gigli.reasons.is_empty());
    }

    #[test]
    fn test_poster_url() {
        let orchestrator = build_test_orchestrator().with_poster_base("https://img.test/w92");
        let results = orchestrator.rank_for_user(1, 5);

        let matrix = results.iter().find(|r| r.movie_id == 3).unwrap();
        assert_eq!(matrix.poster_url, "https://img.test/w92/matrix.jpg");

        let se7en = results.iter().find(|r| r.movie_id == 2).unwrap();
        assert_eq!(se7en.poster_url, "");
    }

    #[test]
    fn test_exact_ties_keep_table_order() {
        let movies = vec![
            movie(9, "Twin A (2000)", "Drama", 3.0, 10, 0.0),
            movie(8, "Twin B (2000)", "Drama", 3.0, 10, 0.0),
            movie(7, "Twin C (2000)", "Drama", 3.0, 10, 0.0),
        ];
        let users = vec![UserProfileRecord { id: 1, rating_mean: 3.0, rating_count: 1 }];
        let store = Arc::new(FeatureStore::from_records(movies, users).unwrap());
        let orchestrator = RankingOrchestrator::new(store);

        let ids: Vec<_> = orchestrator.rank_for_user(1, 3).iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![9, 8, 7]);
    }

    #[test]
    fn test_custom_weights_change_order() {
        // Only the vote average counts
        let weights = ScoreWeights {
            vote_avg: 1.0,
            popularity: 0.0,
            count_log: 0.0,
            user_bias: 0.0,
            mean_bias: 0.0,
        };
        let orchestrator = build_test_orchestrator().with_weights(weights);
        let results = orchestrator.rank_for_user(2, 1);
        // Fight Club: 4.2 + 8.4 is the largest mean + vote
        assert_eq!(results[0].movie_id, 1);
    }

    // ============================================================================
    // Scenario tests
    // ============================================================================

    fn two_movie_orchestrator() -> RankingOrchestrator {
        let movies = vec![
            movie(1, "Fight Club (1999)", "Drama|Thriller", 4.2, 1500, 8.4),
            movie(2, "Se7en (1995)", "Drama|Mystery", 4.0, 1200, 8.1),
        ];
        let users = vec![UserProfileRecord { id: 1, rating_mean: 3.5, rating_count: 10 }];
        RankingOrchestrator::new(Arc::new(FeatureStore::from_records(movies, users).unwrap()))
    }

    #[test]
    fn test_fight_club_seed_recommends_se7en() {
        let orchestrator = two_movie_orchestrator();
        let response = orchestrator.rank(&RankRequest::for_movie(1, 1)).unwrap();

        assert_eq!(response.movie_id, Some(1));
        assert_eq!(response.user_id, None);
        assert_eq!(response.results.len(), 1);

        let top = &response.results[0];
        assert_eq!(top.movie_id, 2);
        assert!(top.reasons.contains(&ReasonTag::SimilarGenres));
        assert!(top.reasons.contains(&ReasonTag::PopularInMovielens));
        // 4.2 vs 4.0 is within the similar-ratings window
        assert!(top.reasons.contains(&ReasonTag::SimilarRatings));
    }

    #[test]
    fn test_search_se7en() {
        let orchestrator = two_movie_orchestrator();
        let hits = orchestrator.search("se7en", 5);
        assert_eq!(
            hits,
            vec![SearchHit {
                movie_id: 2,
                title: "Se7en (1995)".to_string()
            }]
        );
    }

    #[test]
    fn test_search_zero_limit_uses_default() {
        let movies: Vec<_> = (1..=15)
            .map(|i| movie(i, &format!("Star {i} (2000)"), "", 3.0, i, 0.0))
            .collect();
        let users = vec![UserProfileRecord { id: 1, rating_mean: 3.0, rating_count: 1 }];
        let orchestrator =
            RankingOrchestrator::new(Arc::new(FeatureStore::from_records(movies, users).unwrap()));

        assert_eq!(orchestrator.search("star", 0).len(), DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn test_rank_on_empty_store_is_unavailable() {
        let orchestrator = RankingOrchestrator::new(Arc::new(FeatureStore::empty()));
        assert!(matches!(
            orchestrator.rank(&RankRequest::for_user(1, 5)),
            Err(RankError::Unavailable(_))
        ));
    }

    #[test]
    fn test_movie_lookup() {
        let orchestrator = build_test_orchestrator();
        assert_eq!(orchestrator.movie(2).unwrap().title, "Se7en (1995)");
        assert!(matches!(orchestrator.movie(77), Err(RankError::NotFound(_))));
    }

    #[test]
    fn test_reason_tag_serialization() {
        let json = serde_json::to_string(&ReasonTag::PopularInMovielens).unwrap();
        assert_eq!(json, "\"popular_in_movielens\"");
        assert_eq!(ReasonTag::SimilarGenres.to_string(), "similar_genres");
    }

    #[test]
    fn test_response_omits_unused_anchor() {
        let orchestrator = build_test_orchestrator();
        let response = orchestrator.rank(&RankRequest::for_user(1, 2)).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["user_id"], 1);
        assert!(json.get("movie_id").is_none());
        assert_eq!(json["results"].as_array().unwrap().len(), 2);
        assert!(json["latency_ms"].is_u64());
    }
}
