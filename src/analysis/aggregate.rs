//! Cross-window aggregation
//!
//! Reduces the per-window BPM estimates of one track to a median BPM plus a
//! spread-based confidence score.

use crate::analysis::result::TempoEstimate;
use crate::analysis::round_tenths;
use crate::config::EstimatorConfig;

/// Aggregate per-window BPM estimates into one track-level estimate
///
/// Returns `None` for an empty sequence. Otherwise the estimate is the
/// interpolated median of the windows (rounded to 1 decimal place), and the
/// confidence falls linearly from 1.0 with the spread between the widest
/// window estimates, saturating at 0.0 once the spread reaches
/// `config.confidence_spread_bpm`.
pub fn aggregate(window_estimates: &[f32], config: &EstimatorConfig) -> Option<TempoEstimate> {
    if window_estimates.is_empty() {
        return None;
    }

    let mut sorted = window_estimates.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let spread = if sorted.len() > 1 {
        sorted[sorted.len() - 1] - sorted[0]
    } else {
        0.0
    };

    let confidence = (1.0 - spread / config.confidence_spread_bpm).clamp(0.0, 1.0);

    log::debug!(
        "Aggregated {} window estimates: median={:.1} BPM, spread={:.1}, confidence={:.2}",
        window_estimates.len(),
        median,
        spread,
        confidence
    );

    Some(TempoEstimate {
        bpm: round_tenths(median),
        confidence,
    })
}
