//! Tempo estimation modules
//!
//! Derive BPM candidates from an onset-strength envelope:
//! - Autocorrelation tempogram with a log-normal tempo prior
//! - Dynamic-programming beat tracker seeded with a tempo hypothesis
//! - Octave folding into a canonical BPM range

pub mod beat_tracker;
pub mod estimator;

use crate::error::EstimateError;

/// Fold a tempo candidate into the canonical octave range `[min_bpm, max_bpm)`
///
/// Doubles the value while it is below `min_bpm` and halves it while it is at
/// or above `max_bpm`. This corrects the tempo-doubling/halving errors
/// inherent to onset-based detectors without genre priors: any positive
/// finite value converges in a bounded number of steps, and values already
/// in range pass through unchanged.
///
/// # Arguments
///
/// * `value` - Tempo candidate in BPM
/// * `min_bpm` - Inclusive lower bound of the canonical range
/// * `max_bpm` - Exclusive upper bound of the canonical range
///
/// # Errors
///
/// Returns `EstimateError::InvalidTempo` for zero, negative, or non-finite
/// input; such a value never satisfies the fold termination condition under
/// multiplication/division by 2, so it is rejected rather than looped on.
/// `EstimateError::InvalidInput` signals a malformed range.
pub fn fold_bpm(value: f32, min_bpm: f32, max_bpm: f32) -> Result<f32, EstimateError> {
    if !(min_bpm > 0.0 && max_bpm > min_bpm * 2.0) {
        return Err(EstimateError::InvalidInput(format!(
            "Invalid fold range: [{:.1}, {:.1})",
            min_bpm, max_bpm
        )));
    }

    if !value.is_finite() || value <= 0.0 {
        return Err(EstimateError::InvalidTempo(value));
    }

    let mut bpm = value;
    while bpm < min_bpm {
        bpm *= 2.0;
    }
    while bpm >= max_bpm {
        bpm /= 2.0;
    }

    Ok(bpm)
}
