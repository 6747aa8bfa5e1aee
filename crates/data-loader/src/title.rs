//! Title helpers.
//!
//! Catalog titles embed the release year: "Matrix, The (1999)". Search
//! compares against the title with that suffix removed.

/// Remove a trailing parenthesised suffix from a title.
///
/// Example: "Matrix, The (1999)" -> "Matrix, The"
///          "Se7en" -> "Se7en"
///
/// Titles shorter than seven bytes, or whose only `(` opens the title, are
/// returned trimmed but otherwise untouched.
pub fn strip_year(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.len() >= 7 && trimmed.ends_with(')') {
        if let Some(idx) = trimmed.rfind('(') {
            if idx > 0 {
                return trimmed[..idx].trim();
            }
        }
    }
    trimmed
}

/// Extract year from movie title
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
pub fn extract_year_from_title(title: &str) -> Option<u16> {
    let trimmed = title.trim();
    let inner = trimmed.strip_suffix(')')?;
    let start = inner.rfind('(')?;
    let year_str = &inner[start + 1..];
    if year_str.len() != 4 {
        return None;
    }
    year_str.parse::<u16>().ok()
}
