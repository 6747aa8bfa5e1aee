//! # Data Loader Crate
//!
//! This crate is the feature store: it loads the precomputed movie and user
//! feature tables and keeps them in memory for the ranking engine.
//!
//! ## Main Components
//!
//! - **types**: Record types (MovieRecord, UserProfileRecord) and the FeatureStore
//! - **parser**: Lenient CSV parsing with header lookup by column name
//! - **store**: FeatureStore constructors (directory, files, readers, records)
//! - **title**: Title helpers (year suffix handling)
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::FeatureStore;
//! use std::path::Path;
//!
//! let store = FeatureStore::load_from_dir(Path::new("service/data"))?;
//!
//! let movie = store.get_movie(2).unwrap();
//! println!("{} has {} ratings", movie.title, movie.rating_count);
//! ```
//!
//! The store is read-only once built. Share it with `Arc<FeatureStore>`.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod store;
pub mod title;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::parse_or_default;
pub use store::{MOVIES_FILE, USERS_FILE};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    // Core types
    MovieRecord,
    UserProfileRecord,
    FeatureStore,
};
