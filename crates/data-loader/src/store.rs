//! FeatureStore construction.
//!
//! Everything that builds a [`FeatureStore`] lives here:
//! - `load_from_dir`: the two CSV files under a data directory
//! - `load_from_files` / `load_from_readers`: explicit sources
//! - `from_records`: already-parsed rows (tests, synthetic tables)
//!
//! All of them end in `from_records`, which indexes the rows and rejects an
//! empty table.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// File name of the movie table inside a data directory
pub const MOVIES_FILE: &str = "movie_features.csv";

/// File name of the user table inside a data directory
pub const USERS_FILE: &str = "user_features.csv";

impl FeatureStore {
    /// Load both feature tables from a directory
    ///
    /// Expects `movie_features.csv` and `user_features.csv` inside `data_dir`.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading feature tables from {:?}", data_dir);
        Self::load_from_files(&data_dir.join(MOVIES_FILE), &data_dir.join(USERS_FILE))
    }

    /// Load the movie and user tables from explicit paths
    pub fn load_from_files(movies_path: &Path, users_path: &Path) -> Result<Self> {
        // The two tables are independent, parse them in parallel
        let (movies, users) = rayon::join(
            || parser::parse_movies(movies_path),
            || parser::parse_users(users_path),
        );
        Self::from_records(movies?, users?)
    }

    /// Load the tables from in-memory or streamed sources
    pub fn load_from_readers<M: Read, U: Read>(movies: M, users: U) -> Result<Self> {
        let movies = parser::read_movies(movies)?;
        let users = parser::read_users(users)?;
        Self::from_records(movies, users)
    }

    /// Build a store from parsed rows
    ///
    /// Movies keep their input order. When an id repeats, lookups resolve to
    /// the last row carrying it; the earlier rows still take part in full
    /// scans.
    pub fn from_records(movies: Vec<MovieRecord>, users: Vec<UserProfileRecord>) -> Result<Self> {
        if movies.is_empty() || users.is_empty() {
            return Err(DataLoadError::EmptyDatasetError {
                movies: movies.len(),
                users: users.len(),
            });
        }

        let movie_index: HashMap<MovieId, usize> = movies
            .iter()
            .enumerate()
            .map(|(pos, movie)| (movie.id, pos))
            .collect();

        let users: HashMap<UserId, UserProfileRecord> =
            users.into_iter().map(|user| (user.id, user)).collect();

        info!("Loaded {} movies, {} users", movies.len(), users.len());

        Ok(Self {
            movies,
            movie_index,
            users,
        })
    }
}
