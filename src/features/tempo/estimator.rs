//! Global tempo estimation from an onset-strength envelope
//!
//! Tests each tempo lag by autocorrelating short columns of the onset
//! envelope, weights the lag strengths with a log-normal prior centered on a
//! starting tempo hypothesis, and reduces the per-column picks to one global
//! estimate with **median** aggregation, so a single noisy column cannot drag
//! the estimate the way it would with a mean.
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use crate::error::EstimateError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Width of the log-normal tempo prior, in octaves
const PRIOR_SIGMA_OCTAVES: f32 = 1.0;

/// Widest tempo hypothesis range tested before octave folding, in BPM
const SEARCH_MIN_BPM: f32 = 40.0;
const SEARCH_MAX_BPM: f32 = 300.0;

/// Estimate a global tempo from an onset-strength envelope
///
/// Splits the envelope into columns of `window_frames` (hopped by half a
/// column), autocorrelates each column over the lag range corresponding to
/// 40-300 BPM, applies the log-normal prior centered at `start_bpm`, takes
/// each column's best lag, and returns the median of the per-column BPM
/// picks.
///
/// # Arguments
///
/// * `envelope` - Onset-strength envelope (one value per frame transition)
/// * `frame_rate` - Envelope frame rate in Hz (`sample_rate / hop_size`)
/// * `start_bpm` - Center of the tempo prior in BPM
/// * `window_frames` - Column length in frames (typical: 384)
///
/// # Returns
///
/// Global tempo estimate in BPM
///
/// # Errors
///
/// Returns `EstimateError` if:
/// - The envelope is empty or the parameters are invalid
/// - No column produces a usable lag (flat or silent envelope)
pub fn tempo_from_envelope(
    envelope: &[f32],
    frame_rate: f32,
    start_bpm: f32,
    window_frames: usize,
) -> Result<f32, EstimateError> {
    if envelope.is_empty() {
        return Err(EstimateError::InvalidInput(
            "Onset envelope is empty".to_string(),
        ));
    }

    if !(frame_rate > 0.0 && frame_rate.is_finite()) {
        return Err(EstimateError::InvalidInput(format!(
            "Invalid frame rate: {}",
            frame_rate
        )));
    }

    if !(start_bpm > 0.0 && start_bpm.is_finite()) {
        return Err(EstimateError::InvalidInput(format!(
            "Invalid start BPM: {}",
            start_bpm
        )));
    }

    if window_frames == 0 {
        return Err(EstimateError::InvalidInput(
            "Tempogram window must be > 0 frames".to_string(),
        ));
    }

    // Lag range for the tempo search: BPM = 60 * frame_rate / lag
    let lag_min = ((60.0 * frame_rate) / SEARCH_MAX_BPM).floor().max(1.0) as usize;
    let lag_max = ((60.0 * frame_rate) / SEARCH_MIN_BPM).ceil() as usize;

    let column_len = window_frames.min(envelope.len());
    if column_len <= lag_min {
        return Err(EstimateError::ProcessingError(format!(
            "Envelope too short for tempo search: {} frames",
            envelope.len()
        )));
    }

    let hop = (window_frames / 2).max(1);

    log::debug!(
        "Tempo search: {} envelope frames, frame_rate={:.2} Hz, lags [{}, {}], column={} hop={}",
        envelope.len(),
        frame_rate,
        lag_min,
        lag_max,
        column_len,
        hop
    );

    let log2_start = start_bpm.log2();

    let mut column_bpms: Vec<f32> = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + column_len).min(envelope.len());
        let column = &envelope[start..end];

        if let Some(bpm) = best_lag_bpm(column, frame_rate, lag_min, lag_max, log2_start) {
            column_bpms.push(bpm);
        }

        if end == envelope.len() {
            break;
        }
        start += hop;
    }

    if column_bpms.is_empty() {
        return Err(EstimateError::ProcessingError(
            "No tempogram column produced a usable tempo lag".to_string(),
        ));
    }

    column_bpms.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = column_bpms.len() / 2;
    let tempo = if column_bpms.len() % 2 == 0 {
        (column_bpms[mid - 1] + column_bpms[mid]) / 2.0
    } else {
        column_bpms[mid]
    };

    log::debug!(
        "Tempo estimate: {:.2} BPM (median of {} columns)",
        tempo,
        column_bpms.len()
    );

    Ok(tempo)
}

/// Best prior-weighted autocorrelation lag of one envelope column, as BPM
fn best_lag_bpm(
    column: &[f32],
    frame_rate: f32,
    lag_min: usize,
    lag_max: usize,
    log2_start: f32,
) -> Option<f32> {
    if column.len() <= lag_min {
        return None;
    }

    // Zero-lag autocorrelation for normalization
    let ac0: f32 = column.iter().map(|&x| x * x).sum();
    if ac0 < EPSILON {
        return None;
    }

    let lag_hi = lag_max.min(column.len() - 1);

    let mut best_score = 0.0f32;
    let mut best_bpm = None;
    for lag in lag_min..=lag_hi {
        let mut ac = 0.0f32;
        for i in 0..column.len() - lag {
            ac += column[i] * column[i + lag];
        }

        let bpm = 60.0 * frame_rate / lag as f32;
        let octave_distance = (bpm.log2() - log2_start) / PRIOR_SIGMA_OCTAVES;
        let prior = (-0.5 * octave_distance * octave_distance).exp();
        let score = (ac / ac0) * prior;

        if score > best_score {
            best_score = score;
            best_bpm = Some(bpm);
        }
    }

    best_bpm
}
