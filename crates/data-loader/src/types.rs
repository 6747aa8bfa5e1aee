//! Core domain types for the feature tables.
//!
//! Both record types are produced once by the loader and never mutated.
//! The [`FeatureStore`] owns them and hands out references.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::title;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (`userId` column)
pub type UserId = u32;

/// Unique identifier for a movie (`movieId` column)
pub type MovieId = u32;

// =============================================================================
// Records
// =============================================================================

/// One row of the movie feature table.
///
/// The `tmdb_*` fields come from the enrichment source and are empty or zero
/// for movies the enrichment job could not match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(rename = "movie_id")]
    pub id: MovieId,
    /// Catalog title, usually with a trailing year: "Se7en (1995)"
    pub title: String,
    /// Baseline catalog genres, pipe-delimited: "Drama|Thriller"
    pub genres: String,
    pub rating_mean: f64,
    pub rating_count: u32,
    pub tmdb_vote_avg: f64,
    pub tmdb_popularity: f64,
    /// Enrichment genres, pipe-delimited. Preferred over `genres` when present.
    pub tmdb_genres: String,
    /// Relative poster path such as "/abc123.jpg"
    pub tmdb_poster_path: String,
    pub tmdb_overview: String,
    pub tmdb_release_date: String,
}

impl MovieRecord {
    /// Year from a trailing "(YYYY)" suffix, if the title carries one
    pub fn year(&self) -> Option<u16> {
        title::extract_year_from_title(&self.title)
    }

    /// Title with any trailing parenthesised suffix removed
    pub fn title_without_year(&self) -> &str {
        title::strip_year(&self.title)
    }

    /// The genre list used for similarity.
    ///
    /// Enrichment genres win whenever they are non-blank.
    pub fn preferred_genres(&self) -> &str {
        if self.tmdb_genres.trim().is_empty() {
            &self.genres
        } else {
            &self.tmdb_genres
        }
    }

    pub fn has_poster(&self) -> bool {
        !self.tmdb_poster_path.trim().is_empty()
    }
}

/// One row of the user feature table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfileRecord {
    #[serde(rename = "user_id")]
    pub id: UserId,
    pub rating_mean: f64,
    pub rating_count: u32,
}

// =============================================================================
// FeatureStore - The In-Memory Snapshot
// =============================================================================

/// Immutable snapshot of both feature tables.
///
/// Built once (see `store.rs` for the constructors) and shared behind an
/// `Arc`. There are no mutators, so concurrent readers need no locking.
///
/// `movies` keeps file order; this is the candidate set every ranking pass
/// scans. `movie_index` maps an id to its position in `movies`.
#[derive(Debug, Default)]
pub struct FeatureStore {
    pub(crate) movies: Vec<MovieRecord>,
    pub(crate) movie_index: HashMap<MovieId, usize>,
    pub(crate) users: HashMap<UserId, UserProfileRecord>,
}

impl FeatureStore {
    /// A store with no data, used when start-up loading failed
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&MovieRecord> {
        self.movie_index.get(&id).map(|&pos| &self.movies[pos])
    }

    /// Get a user profile by ID
    pub fn get_user(&self, id: UserId) -> Option<&UserProfileRecord> {
        self.users.get(&id)
    }

    /// All movies in table order
    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    /// All user IDs (unordered)
    pub fn user_ids(&self) -> Vec<UserId> {
        self.users.keys().copied().collect()
    }

    /// (movies, users)
    pub fn counts(&self) -> (usize, usize) {
        (self.movies.len(), self.users.len())
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
