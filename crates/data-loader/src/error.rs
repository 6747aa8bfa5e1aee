//! Error types for the data-loader crate.
//!
//! Only whole-table problems are errors here. Individual bad fields are
//! coerced by [`crate::parser::parse_or_default`] and never reach this type.

use thiserror::Error;

/// Errors that can occur while loading the feature tables
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader could not frame the input (broken quoting, read failure)
    #[error("CSV error in {table} table: {source}")]
    CsvError {
        table: String,
        #[source]
        source: csv::Error,
    },

    /// A required column is missing from a table header
    ///
    /// Fatal: without it no row of the table can be interpreted.
    #[error("Missing required column `{column}` in {table} table")]
    SchemaError { table: String, column: String },

    /// The tables were structurally fine but one of them had no rows
    #[error("Loaded empty data (movies={movies} users={users})")]
    EmptyDatasetError { movies: usize, users: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
