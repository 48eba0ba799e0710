//! Harmonic-percussive source separation (HPSS)
//!
//! Splits a magnitude spectrogram into a tonal/sustained component and a
//! rhythmic/transient component by median filtering: harmonic energy forms
//! horizontal ridges (stable across time), percussive energy forms vertical
//! ridges (broadband within a frame). Tempo analysis keeps only the
//! percussive component.
//!
//! # Reference
//!
//! Fitzgerald, D. (2010). Harmonic/Percussive Separation Using Median Filtering.
//! *Proceedings of the International Conference on Digital Audio Effects (DAFx)*.

use crate::error::EstimateError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Extract the percussive component of a magnitude spectrogram
///
/// Median-filters the spectrogram along time (harmonic enhancement) and
/// along frequency (percussive enhancement), then applies Wiener-style soft
/// masks so the two components sum to the input.
///
/// # Arguments
///
/// * `magnitude_spec_frames` - Magnitude spectrogram (n_frames × n_bins)
/// * `kernel` - Median filter length in frames/bins (typical: 31)
/// * `power` - Soft-mask exponent (typical: 2.0)
///
/// # Returns
///
/// Percussive magnitude spectrogram with the same shape as the input
///
/// # Errors
///
/// Returns `EstimateError::InvalidInput` if the kernel is 0 or the frames
/// have inconsistent lengths.
pub fn percussive_component(
    magnitude_spec_frames: &[Vec<f32>],
    kernel: usize,
    power: f32,
) -> Result<Vec<Vec<f32>>, EstimateError> {
    if kernel == 0 {
        return Err(EstimateError::InvalidInput(
            "HPSS kernel must be > 0".to_string(),
        ));
    }

    if magnitude_spec_frames.is_empty() {
        return Ok(Vec::new());
    }

    let n_frames = magnitude_spec_frames.len();
    let n_bins = magnitude_spec_frames[0].len();
    for (i, frame) in magnitude_spec_frames.iter().enumerate() {
        if frame.len() != n_bins {
            return Err(EstimateError::InvalidInput(format!(
                "Inconsistent frame lengths: frame 0 has {} bins, frame {} has {} bins",
                n_bins,
                i,
                frame.len()
            )));
        }
    }

    log::debug!(
        "HPSS: {} frames, {} bins, kernel={}, power={:.1}",
        n_frames,
        n_bins,
        kernel,
        power
    );

    let half = kernel / 2;

    // Harmonic estimate: median across time per frequency bin
    let mut harmonic = vec![vec![0.0f32; n_bins]; n_frames];
    let mut column = Vec::with_capacity(kernel);
    for bin in 0..n_bins {
        for t in 0..n_frames {
            let start = t.saturating_sub(half);
            let end = (t + half + 1).min(n_frames);
            column.clear();
            for frame in &magnitude_spec_frames[start..end] {
                column.push(frame[bin]);
            }
            harmonic[t][bin] = median_of(&mut column);
        }
    }

    // Percussive estimate: median across frequency per frame
    let mut percussive = vec![vec![0.0f32; n_bins]; n_frames];
    let mut row = Vec::with_capacity(kernel);
    for (t, frame) in magnitude_spec_frames.iter().enumerate() {
        for bin in 0..n_bins {
            let start = bin.saturating_sub(half);
            let end = (bin + half + 1).min(n_bins);
            row.clear();
            row.extend_from_slice(&frame[start..end]);
            percussive[t][bin] = median_of(&mut row);
        }
    }

    // Wiener-style soft masking of the original magnitudes
    let mut output = vec![vec![0.0f32; n_bins]; n_frames];
    for t in 0..n_frames {
        for bin in 0..n_bins {
            let h = harmonic[t][bin].max(0.0).powf(power);
            let p = percussive[t][bin].max(0.0).powf(power);
            let mask = if h + p > EPSILON { p / (h + p) } else { 0.0 };
            output[t][bin] = magnitude_spec_frames[t][bin] * mask;
        }
    }

    Ok(output)
}

/// Median of a scratch buffer (sorts in place)
fn median_of(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
