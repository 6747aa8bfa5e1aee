//! # Search Crate
//!
//! Lexical title search over the feature store's movie table.
//!
//! Matching is case-insensitive and ignores the "(YYYY)" suffix catalog
//! titles carry, so "matrix" finds "Matrix, The (1999)". Among matches,
//! prefix hits rank above substring hits and more-rated movies break ties.
//!
//! ## Example Usage
//!
//! ```ignore
//! use search::TitleSearchRanker;
//!
//! let hits = TitleSearchRanker.search(store.movies(), "se7en", 5);
//! for hit in hits {
//!     println!("{}: {}", hit.movie_id, hit.title);
//! }
//! ```

pub mod ranker;

pub use ranker::{SearchHit, TitleSearchRanker, normalize_query};
