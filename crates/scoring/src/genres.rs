//! Genre sets and genre similarity.

use data_loader::MovieRecord;
use std::collections::HashSet;

/// Parse a pipe-delimited genre list into a lowercase set.
///
/// Example: "Drama| Thriller|drama" -> {"drama", "thriller"}
///
/// Blank entries are dropped, so "" and "|" both give an empty set.
pub fn parse_genres(raw: &str) -> HashSet<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Genre set used for similarity (enrichment genres when present)
pub fn genre_set(movie: &MovieRecord) -> HashSet<String> {
    parse_genres(movie.preferred_genres())
}

/// Jaccard similarity of two genre sets.
///
/// Jaccard similarity = |intersection| / |union|
///
/// Returns 0.0 when either side is empty: missing genre data earns no
/// similarity credit.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Genre Jaccard between two movies, using each movie's preferred genres
pub fn genre_jaccard(a: &MovieRecord, b: &MovieRecord) -> f64 {
    jaccard(&genre_set(a), &genre_set(b))
}
