//! Core trait for the scoring engine.
//!
//! A scorer turns a (candidate, context) pair into a relevance score. The
//! context is whatever the ranking is anchored on: a user profile for
//! personalised ranking, a seed movie for similarity.

use data_loader::MovieRecord;

/// Scores one candidate movie against a ranking context.
///
/// ## Design Note
/// - `Send + Sync` so one scorer instance can serve concurrent requests
/// - `score` must be pure: same inputs, same output, no side effects
/// - Higher is better; scores are only compared within one ranking pass
pub trait Scorer<Ctx: ?Sized>: Send + Sync {
    /// Returns the name of this scorer (for logging/debugging)
    fn name(&self) -> &str;

    /// Relevance of `candidate` given `context`
    fn score(&self, candidate: &MovieRecord, context: &Ctx) -> f64;
}
