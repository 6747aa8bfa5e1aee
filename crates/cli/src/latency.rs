//! Latency summary for the `benchmark` command.

use std::time::Duration;

/// p50 / p95 / p99 / mean of a set of request timings, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub mean: f64,
}

impl LatencySummary {
    /// Summarise `timings`; `None` when there are none
    pub fn from_timings(timings: &[Duration]) -> Option<Self> {
        if timings.is_empty() {
            return None;
        }

        let mut millis: Vec<f64> = timings.iter().map(|t| t.as_secs_f64() * 1000.0).collect();
        millis.sort_by(|a, b| a.total_cmp(b));

        let mean = millis.iter().sum::<f64>() / millis.len() as f64;
        Some(Self {
            p50: percentile(&millis, 50.0),
            p95: percentile(&millis, 95.0),
            p99: percentile(&millis, 99.0),
            mean,
        })
    }
}

/// Percentile of sorted values with linear interpolation between ranks
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let fraction = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}
