//! Scoring engine for candidate movies.
//!
//! This crate provides:
//! - Scorer trait shared by both ranking modes
//! - UserAffinityScorer for user-anchored ranking
//! - SimilarityScorer (with SeedMovie context) for "more like this" ranking
//! - Genre parsing and Jaccard similarity
//!
//! Everything here is pure computation over `data_loader` records: no I/O,
//! no locks, no shared state.
//!
//! ## Example Usage
//! ```ignore
//! use scoring::{Scorer, SeedMovie, SimilarityScorer, UserAffinityScorer};
//!
//! let user = store.get_user(42);
//! let personal = UserAffinityScorer::new().score(&candidate, &user);
//!
//! let seed = SeedMovie::new(store.get_movie(1).unwrap());
//! let similar = SimilarityScorer.score(&candidate, &seed);
//! ```

pub mod traits;
pub mod weights;
pub mod genres;
pub mod user_affinity;
pub mod similarity;

// Re-export main types
pub use traits::Scorer;
pub use weights::ScoreWeights;
pub use genres::{genre_jaccard, parse_genres};
pub use user_affinity::{UserAffinityScorer, mean_gap};
pub use similarity::{SeedMovie, SimilarityScorer};
