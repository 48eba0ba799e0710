//! Per-window tempo estimation
//!
//! The core of the pipeline: decode one excerpt, keep its percussive
//! content, extract a median-aggregated onset-strength envelope, derive two
//! tempo candidates (a direct tempogram estimate and a beat-track-derived
//! estimate seeded by it), fold both into the canonical octave range, and
//! average them into one window BPM.

use std::path::Path;

use crate::analysis::round_tenths;
use crate::config::EstimatorConfig;
use crate::error::EstimateError;
use crate::features::onset::hpss::percussive_component;
use crate::features::onset::strength::onset_envelope;
use crate::features::spectrum::compute_stft;
use crate::features::tempo::beat_tracker::beat_track_tempo;
use crate::features::tempo::estimator::tempo_from_envelope;
use crate::features::tempo::fold_bpm;

/// Estimate the tempo of one analysis window
///
/// Pure function of (track bytes, offset, duration): no state is shared
/// between windows, and all buffers are released when the call returns.
///
/// # Arguments
///
/// * `path` - Track file path
/// * `offset_seconds` - Window start in seconds (negative values clamp to 0)
/// * `window_seconds` - Window length in seconds
/// * `config` - Estimation parameters
///
/// # Returns
///
/// * `Ok(Some(bpm))` - window BPM, rounded to 1 decimal place
/// * `Ok(None)` - the window was too short or had no usable onset envelope;
///   absence is distinct from any valid (low) BPM value
///
/// # Errors
///
/// Returns `EstimateError` when decoding or analysis fails outright; the
/// caller converts such failures to absence at the track boundary.
pub fn estimate_window(
    path: &Path,
    offset_seconds: f32,
    window_seconds: f32,
    config: &EstimatorConfig,
) -> Result<Option<f32>, EstimateError> {
    let sample_rate = config.analysis_sample_rate;
    let samples = crate::io::decoder::decode_segment(
        path,
        offset_seconds.max(0.0),
        window_seconds,
        sample_rate,
    )?;

    let min_samples = (config.min_segment_seconds * sample_rate as f32) as usize;
    if samples.len() < min_samples {
        log::debug!(
            "Window at {:.1}s too short: {} samples (< {})",
            offset_seconds,
            samples.len(),
            min_samples
        );
        return Ok(None);
    }

    let spectrogram = compute_stft(&samples, config.frame_size, config.hop_size)?;
    let percussive = percussive_component(&spectrogram, config.hpss_kernel, config.hpss_power)?;
    let envelope = onset_envelope(&percussive, sample_rate, config.n_mels)?;

    if envelope.len() < config.min_envelope_frames {
        log::debug!(
            "Window at {:.1}s has unusable onset envelope: {} frames (< {})",
            offset_seconds,
            envelope.len(),
            config.min_envelope_frames
        );
        return Ok(None);
    }

    let frame_rate = sample_rate as f32 / config.hop_size as f32;

    let onset_tempo = tempo_from_envelope(
        &envelope,
        frame_rate,
        config.start_bpm,
        config.tempogram_window_frames,
    )?;
    let beat_tempo = beat_track_tempo(&envelope, frame_rate, onset_tempo, config.beat_tightness)?;

    let folded_onset = fold_bpm(onset_tempo, config.fold_min_bpm, config.fold_max_bpm)?;
    let folded_beat = fold_bpm(beat_tempo, config.fold_min_bpm, config.fold_max_bpm)?;

    let window_bpm = round_tenths((folded_onset + folded_beat) * 0.5);

    log::debug!(
        "Window at {:.1}s: onset tempo {:.2} -> {:.2}, beat tempo {:.2} -> {:.2}, window BPM {:.1}",
        offset_seconds,
        onset_tempo,
        folded_onset,
        beat_tempo,
        folded_beat,
        window_bpm
    );

    Ok(Some(window_bpm))
}
