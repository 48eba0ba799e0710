//! Onset-strength envelope extraction
//!
//! Projects a magnitude spectrogram onto a mel filterbank, log-compresses,
//! and takes half-wave rectified first-order differences along time. The
//! per-band differences are reduced to one value per frame transition with
//! **median** aggregation across bands, which is robust to spectral outliers
//! and noise bursts in a way mean aggregation is not.
//!
//! # Reference
//!
//! Böck, S., & Widmer, G. (2013). Maximum Filter Vibrato Suppression for Onset Detection.
//! *Proceedings of the International Conference on Digital Audio Effects (DAFx)*.

use crate::error::EstimateError;

/// Floor for log-power compression
const AMIN: f32 = 1e-10;

/// Compute a median-aggregated onset-strength envelope
///
/// # Arguments
///
/// * `magnitude_spec_frames` - Magnitude spectrogram (n_frames × n_bins)
/// * `sample_rate` - Sample rate in Hz
/// * `n_mels` - Number of mel bands (typical: 128)
///
/// # Returns
///
/// Onset envelope as `Vec<f32>` with one value per frame transition
/// (`n_frames - 1` values). Fewer than 2 frames yield an empty envelope.
///
/// # Errors
///
/// Returns `EstimateError::InvalidInput` if `sample_rate` or `n_mels` is 0,
/// or the frames have inconsistent lengths.
pub fn onset_envelope(
    magnitude_spec_frames: &[Vec<f32>],
    sample_rate: u32,
    n_mels: usize,
) -> Result<Vec<f32>, EstimateError> {
    if sample_rate == 0 {
        return Err(EstimateError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }

    if n_mels == 0 {
        return Err(EstimateError::InvalidInput(
            "Mel band count must be > 0".to_string(),
        ));
    }

    if magnitude_spec_frames.len() < 2 {
        return Ok(Vec::new());
    }

    let n_bins = magnitude_spec_frames[0].len();
    if n_bins == 0 {
        return Err(EstimateError::InvalidInput(
            "Empty magnitude frames".to_string(),
        ));
    }
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
        "Computing onset envelope: {} frames, {} bins, {} mel bands",
        magnitude_spec_frames.len(),
        n_bins,
        n_mels
    );

    let filterbank = mel_filterbank(n_mels, n_bins, sample_rate);

    // Log-power mel spectrogram, one row per frame
    let mut mel_frames: Vec<Vec<f32>> = Vec::with_capacity(magnitude_spec_frames.len());
    for frame in magnitude_spec_frames {
        let mut mel_row = vec![0.0f32; n_mels];
        for (band, filter) in filterbank.iter().enumerate() {
            let mut energy = 0.0f32;
            for &(bin, weight) in filter {
                let mag = frame[bin];
                energy += weight * mag * mag;
            }
            mel_row[band] = 10.0 * energy.max(AMIN).log10();
        }
        mel_frames.push(mel_row);
    }

    // Half-wave rectified temporal difference, median across bands
    let mut envelope = Vec::with_capacity(mel_frames.len() - 1);
    let mut diffs = vec![0.0f32; n_mels];
    for t in 1..mel_frames.len() {
        for band in 0..n_mels {
            diffs[band] = (mel_frames[t][band] - mel_frames[t - 1][band]).max(0.0);
        }
        diffs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = n_mels / 2;
        let value = if n_mels % 2 == 0 {
            (diffs[mid - 1] + diffs[mid]) / 2.0
        } else {
            diffs[mid]
        };
        envelope.push(value);
    }

    Ok(envelope)
}

/// Build a triangular mel filterbank as sparse (bin, weight) lists
///
/// Uses the HTK mel scale. Each of the `n_mels` filters spans three
/// consecutive mel points, rising then falling linearly over FFT bins.
fn mel_filterbank(n_mels: usize, n_bins: usize, sample_rate: u32) -> Vec<Vec<(usize, f32)>> {
    let nyquist = sample_rate as f32 / 2.0;
    let mel_max = hz_to_mel(nyquist);

    // n_mels + 2 equally spaced points on the mel scale
    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_max * i as f32 / (n_mels + 1) as f32)
        .collect();
    let hz_points: Vec<f32> = mel_points.iter().map(|&m| mel_to_hz(m)).collect();

    // Bin center frequencies (n_bins spans DC..Nyquist)
    let bin_hz = |bin: usize| nyquist * bin as f32 / (n_bins - 1).max(1) as f32;

    let mut filterbank = Vec::with_capacity(n_mels);
    for m in 0..n_mels {
        let (lo, center, hi) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
        let mut filter = Vec::new();
        for bin in 0..n_bins {
            let f = bin_hz(bin);
            let weight = if f <= lo || f >= hi {
                0.0
            } else if f <= center {
                (f - lo) / (center - lo).max(f32::MIN_POSITIVE)
            } else {
                (hi - f) / (hi - center).max(f32::MIN_POSITIVE)
            };
            if weight > 0.0 {
                filter.push((bin, weight));
            }
        }
        filterbank.push(filter);
    }

    filterbank
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_scale_roundtrip() {
        for hz in [0.0f32, 100.0, 1000.0, 8000.0, 11025.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!(
                (back - hz).abs() < 0.5,
                "Mel roundtrip drifted: {} -> {}",
                hz,
                back
            );
        }
    }

    #[test]
    fn test_filterbank_covers_bands() {
        let fb = mel_filterbank(40, 1025, 22050);
        assert_eq!(fb.len(), 40);
        // Every filter should touch at least one bin
        for (i, filter) in fb.iter().enumerate() {
            assert!(!filter.is_empty(), "Mel band {} has no bins", i);
        }
    }

    #[test]
    fn test_onset_envelope_peaks_at_transients() {
        // Quiet spectrogram with two loud broadband frames
        let n_bins = 1025;
        let mut spec = vec![vec![0.01f32; n_bins]; 40];
        for bin in 0..n_bins {
            spec[10][bin] = 1.0;
            spec[25][bin] = 1.0;
        }

        let env = onset_envelope(&spec, 22050, 64).unwrap();
        assert_eq!(env.len(), 39);

        // Envelope index t corresponds to the transition into frame t + 1
        let peak = env
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap();
        assert!(
            peak == 9 || peak == 24,
            "Envelope should peak at a transient onset, got index {}",
            peak
        );

        // Steady-state transitions should be near zero
        assert!(env[30] < env[peak] * 0.1);
    }

    #[test]
    fn test_onset_envelope_too_few_frames() {
        let spec = vec![vec![0.5f32; 1025]];
        let env = onset_envelope(&spec, 22050, 64).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn test_onset_envelope_invalid_params() {
        let spec = vec![vec![0.5f32; 1025]; 10];
        assert!(onset_envelope(&spec, 0, 64).is_err());
        assert!(onset_envelope(&spec, 22050, 0).is_err());
    }
}
