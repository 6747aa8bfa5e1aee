//! Parser for the feature CSV files.
//!
//! Both tables start with a header row and columns are looked up by name,
//! so column order does not matter:
//! - movie_features.csv: movieId,title,rating_mean,rating_count[,genres,tmdb_*...]
//! - user_features.csv: userId,rating_mean,rating_count
//!
//! Ingestion is lenient. A missing required column fails the whole table,
//! but a bad value inside a row is replaced by its zero value through
//! [`parse_or_default`], and a row with the wrong number of fields is
//! skipped.

use crate::error::{DataLoadError, Result};
use crate::types::{MovieRecord, UserProfileRecord};
use csv::{ByteRecord, ReaderBuilder};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const MOVIES_TABLE: &str = "movies";
pub const USERS_TABLE: &str = "users";

pub const MOVIE_REQUIRED_COLUMNS: [&str; 4] = ["movieId", "title", "rating_mean", "rating_count"];
pub const USER_REQUIRED_COLUMNS: [&str; 3] = ["userId", "rating_mean", "rating_count"];

// =============================================================================
// Lenient field parsing
// =============================================================================

/// Parse a raw field, falling back to the type's zero value.
///
/// `None` (column absent or row too short), blank text and text that does
/// not parse as `T` all yield `T::default()`. Surrounding whitespace is
/// ignored.
pub fn parse_or_default<T>(raw: Option<&str>) -> T
where
    T: FromStr + Default,
{
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// [`parse_or_default`] for floats; non-finite values (`NaN`, `inf`) also become 0.0
pub fn parse_float_or_default(raw: Option<&str>) -> f64 {
    let value: f64 = parse_or_default(raw);
    if value.is_finite() { value } else { 0.0 }
}

// =============================================================================
// Header handling
// =============================================================================

/// Column name -> position, built from a header row.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
    width: usize,
}

impl HeaderIndex {
    pub fn from_header<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut columns = HashMap::new();
        let mut width = 0;
        for (pos, name) in names.into_iter().enumerate() {
            columns.insert(name.trim().to_string(), pos);
            width = pos + 1;
        }
        Self { columns, width }
    }

    /// Number of columns in the header
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Fail with a `SchemaError` naming the first missing column
    pub fn require(&self, table: &str, required: &[&str]) -> Result<()> {
        match required.iter().find(|col| !self.contains(col)) {
            Some(missing) => Err(DataLoadError::SchemaError {
                table: table.to_string(),
                column: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Raw text of `column` in `row`, if the column exists
    pub fn field<'r>(&self, row: &'r [Cow<'r, str>], column: &str) -> Option<&'r str> {
        let pos = *self.columns.get(column)?;
        row.get(pos).map(|value| &**value)
    }

    /// Raw text of `column` as an owned string, empty when absent
    fn text(&self, row: &[Cow<'_, str>], column: &str) -> String {
        self.field(row, column).unwrap_or_default().to_string()
    }
}

// =============================================================================
// Table readers
// =============================================================================

/// Read the movie table from any reader
pub fn read_movies<R: Read>(input: R) -> Result<Vec<MovieRecord>> {
    read_table(input, MOVIES_TABLE, &MOVIE_REQUIRED_COLUMNS, |header, row| {
        MovieRecord {
            id: parse_or_default(header.field(row, "movieId")),
            title: header.text(row, "title"),
            genres: header.text(row, "genres"),
            rating_mean: parse_float_or_default(header.field(row, "rating_mean")),
            rating_count: parse_or_default(header.field(row, "rating_count")),
            tmdb_vote_avg: parse_float_or_default(header.field(row, "tmdb_vote_avg")),
            tmdb_popularity: parse_float_or_default(header.field(row, "tmdb_popularity")),
            tmdb_genres: header.text(row, "tmdb_genres"),
            tmdb_poster_path: header.text(row, "tmdb_poster_path"),
            tmdb_overview: header.text(row, "tmdb_overview"),
            tmdb_release_date: header.text(row, "tmdb_release_date"),
        }
    })
}

/// Read the user table from any reader
pub fn read_users<R: Read>(input: R) -> Result<Vec<UserProfileRecord>> {
    read_table(input, USERS_TABLE, &USER_REQUIRED_COLUMNS, |header, row| {
        UserProfileRecord {
            id: parse_or_default(header.field(row, "userId")),
            rating_mean: parse_float_or_default(header.field(row, "rating_mean")),
            rating_count: parse_or_default(header.field(row, "rating_count")),
        }
    })
}

/// Parse the movie_features.csv file
pub fn parse_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    read_movies(open_file(path)?)
}

/// Parse the user_features.csv file
pub fn parse_users(path: &Path) -> Result<Vec<UserProfileRecord>> {
    read_users(open_file(path)?)
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Shared row loop for both tables.
///
/// Fields are decoded lossily so stray Latin-1 bytes in titles or overviews
/// do not abort the load.
fn read_table<R, T, F>(input: R, table: &str, required: &[&str], build: F) -> Result<Vec<T>>
where
    R: Read,
    F: Fn(&HeaderIndex, &[Cow<'_, str>]) -> T,
{
    let csv_error = |source| DataLoadError::CsvError {
        table: table.to_string(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let header_row = reader.byte_headers().map_err(csv_error)?.clone();
    let header_names: Vec<Cow<'_, str>> = header_row
        .iter()
        .map(String::from_utf8_lossy)
        .collect();
    let header = HeaderIndex::from_header(header_names.iter().map(|name| &**name));
    header.require(table, required)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut record = ByteRecord::new();

    while reader.read_byte_record(&mut record).map_err(csv_error)? {
        if record.len() != header.width() {
            skipped += 1;
            debug!(
                table,
                line = ?record.position().map(|p| p.line()),
                expected = header.width(),
                found = record.len(),
                "Skipping row with unexpected field count"
            );
            continue;
        }
        let fields: Vec<Cow<'_, str>> = record.iter().map(String::from_utf8_lossy).collect();
        rows.push(build(&header, &fields));
    }

    if skipped > 0 {
        debug!(table, skipped, "Skipped malformed rows");
    }
    Ok(rows)
}
