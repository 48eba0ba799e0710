//! Tempo estimation result types

use serde::{Deserialize, Serialize};

/// Aggregated tempo estimate for one track
///
/// An estimate only exists when at least one analysis window produced a
/// usable BPM; tracks where estimation fails entirely are represented by
/// the *absence* of this value (`Option<TempoEstimate>`), never by a
/// sentinel BPM of zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoEstimate {
    /// Median BPM across analysis windows, rounded to 1 decimal place
    pub bpm: f32,

    /// Agreement score in [0, 1]
    ///
    /// Derived from the spread between per-window estimates: 1.0 when all
    /// windows agree exactly, falling linearly to 0.0 as the spread widens.
    /// This is a consistency measure, not a statistical probability.
    pub confidence: f32,
}

impl TempoEstimate {
    /// BPM rounded to the nearest whole beat
    ///
    /// Uses round-half-away-from-zero (`f32::round`), so a boundary value
    /// like 120.5 rounds to 121.
    pub fn bpm_int(&self) -> i64 {
        self.bpm.round() as i64
    }
}
