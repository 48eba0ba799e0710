//! Dynamic-programming beat tracker
//!
//! Places beats on an onset-strength envelope by maximizing onset energy at
//! beat positions while penalizing deviation from a seeded beat period, then
//! reads the tempo back off the median inter-beat interval. Only that tempo
//! estimate is consumed by the pipeline; the beat positions themselves are
//! an intermediate.
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use crate::error::EstimateError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Track beats through an onset envelope and return the implied tempo
///
/// Seeds the tracker with `start_bpm` as the starting tempo hypothesis,
/// runs the Ellis dynamic program (local onset score plus a log-squared
/// transition cost weighted by `tightness`), backtracks the best beat
/// sequence, and derives the tempo from the median inter-beat interval.
///
/// A flat envelope or a beat sequence too short to measure an interval
/// falls back to the seeded tempo: the seed is the tracker's own prior,
/// so returning it is the no-evidence answer, not a failure.
///
/// # Arguments
///
/// * `envelope` - Onset-strength envelope (one value per frame transition)
/// * `frame_rate` - Envelope frame rate in Hz (`sample_rate / hop_size`)
/// * `start_bpm` - Starting tempo hypothesis in BPM
/// * `tightness` - Transition-cost weight (typical: 100.0)
///
/// # Returns
///
/// Beat-track-derived tempo estimate in BPM
///
/// # Errors
///
/// Returns `EstimateError::InvalidInput` if the envelope is empty or a
/// parameter is non-positive.
pub fn beat_track_tempo(
    envelope: &[f32],
    frame_rate: f32,
    start_bpm: f32,
    tightness: f32,
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

    if !(tightness > 0.0 && tightness.is_finite()) {
        return Err(EstimateError::InvalidInput(format!(
            "Invalid tightness: {}",
            tightness
        )));
    }

    let period = ((60.0 * frame_rate / start_bpm).round() as usize).max(1);

    // Normalize by the envelope's spread so tightness is signal-independent
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let var =
        envelope.iter().map(|&x| (x - mean) * (x - mean)).sum::<f32>() / envelope.len() as f32;
    let std = var.sqrt();
    if std < EPSILON {
        log::debug!("Flat onset envelope, returning seeded tempo {:.2}", start_bpm);
        return Ok(start_bpm);
    }
    let normalized: Vec<f32> = envelope.iter().map(|&x| x / std).collect();

    let localscore = local_score(&normalized, period);

    log::debug!(
        "Beat tracking: {} frames, period={} frames ({:.2} BPM seed)",
        envelope.len(),
        period,
        start_bpm
    );

    // Dynamic program: each frame scores its best predecessor within
    // [i - 2*period, i - period/2]
    let n = localscore.len();
    let mut cumscore = vec![0.0f32; n];
    let mut backlink = vec![-1i64; n];

    for i in 0..n {
        let lo = i as i64 - 2 * period as i64;
        let hi = i as i64 - (period as i64 + 1) / 2;

        let mut best = f32::NEG_INFINITY;
        let mut best_p = -1i64;
        let mut p = lo.max(0);
        while p <= hi {
            let interval = (i as i64 - p) as f32;
            let log_ratio = (interval / period as f32).ln();
            let score = cumscore[p as usize] - tightness * log_ratio * log_ratio;
            if score > best {
                best = score;
                best_p = p;
            }
            p += 1;
        }

        if best_p >= 0 && best > 0.0 {
            cumscore[i] = localscore[i] + best;
            backlink[i] = best_p;
        } else {
            cumscore[i] = localscore[i];
        }
    }

    let beats = backtrack_beats(&cumscore, &backlink);

    if beats.len() < 2 {
        log::debug!(
            "Beat tracker found {} beats, returning seeded tempo {:.2}",
            beats.len(),
            start_bpm
        );
        return Ok(start_bpm);
    }

    // Tempo from the median inter-beat interval
    let mut intervals: Vec<f32> = beats.windows(2).map(|w| (w[1] - w[0]) as f32).collect();
    intervals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = intervals.len() / 2;
    let median_interval = if intervals.len() % 2 == 0 {
        (intervals[mid - 1] + intervals[mid]) / 2.0
    } else {
        intervals[mid]
    };

    if median_interval < EPSILON {
        return Err(EstimateError::NumericalError(
            "Degenerate beat interval".to_string(),
        ));
    }

    let tempo = 60.0 * frame_rate / median_interval;
    log::debug!(
        "Beat tracker: {} beats, median interval {:.1} frames, tempo {:.2} BPM",
        beats.len(),
        median_interval,
        tempo
    );

    Ok(tempo)
}

/// Smooth the envelope with a Gaussian window scaled to the beat period
fn local_score(envelope: &[f32], period: usize) -> Vec<f32> {
    let half = period as i64;
    let window: Vec<f32> = (-half..=half)
        .map(|offset| {
            let z = offset as f32 * 32.0 / period as f32;
            (-0.5 * z * z).exp()
        })
        .collect();

    let n = envelope.len();
    let mut score = vec![0.0f32; n];
    for i in 0..n {
        let mut acc = 0.0f32;
        for (w, &weight) in window.iter().enumerate() {
            let j = i as i64 + w as i64 - half;
            if j >= 0 && (j as usize) < n {
                acc += weight * envelope[j as usize];
            }
        }
        score[i] = acc;
    }
    score
}

/// Pick the final beat and walk the backlinks to the start
///
/// The final beat is the last local maximum of the cumulative score that
/// reaches at least half the median local-maximum score, which avoids
/// terminating the sequence on a trailing low-energy tail.
fn backtrack_beats(cumscore: &[f32], backlink: &[i64]) -> Vec<usize> {
    let n = cumscore.len();
    if n == 0 {
        return Vec::new();
    }

    let mut maxima: Vec<usize> = Vec::new();
    for i in 1..n.saturating_sub(1) {
        if cumscore[i] > cumscore[i - 1] && cumscore[i] >= cumscore[i + 1] {
            maxima.push(i);
        }
    }
    if maxima.is_empty() {
        return Vec::new();
    }

    let mut peak_scores: Vec<f32> = maxima.iter().map(|&i| cumscore[i]).collect();
    peak_scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let threshold = 0.5 * peak_scores[peak_scores.len() / 2];

    let tail = match maxima.iter().rev().find(|&&i| cumscore[i] >= threshold) {
        Some(&i) => i,
        None => return Vec::new(),
    };

    let mut beats = vec![tail];
    let mut cursor = tail;
    while backlink[cursor] >= 0 {
        cursor = backlink[cursor] as usize;
        beats.push(cursor);
    }
    beats.reverse();
    beats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse_envelope(bpm: f32, frame_rate: f32, n_frames: usize) -> Vec<f32> {
        let period = (60.0 * frame_rate / bpm).round() as usize;
        let mut env = vec![0.0f32; n_frames];
        for (i, v) in env.iter_mut().enumerate() {
            if i % period == 0 {
                *v = 1.0;
            }
        }
        env
    }

    #[test]
    fn test_beat_track_recovers_seeded_tempo() {
        let frame_rate = 22050.0 / 512.0;
        let env = pulse_envelope(120.0, frame_rate, 2000);

        let tempo = beat_track_tempo(&env, frame_rate, 120.0, 100.0).unwrap();
        assert!(
            (tempo - 120.0).abs() < 5.0,
            "Expected tempo near 120, got {:.2}",
            tempo
        );
    }

    #[test]
    fn test_beat_track_corrects_slightly_off_seed() {
        // Seed 10% off the true pulse; the DP should settle on the pulse
        let frame_rate = 22050.0 / 512.0;
        let env = pulse_envelope(100.0, frame_rate, 2000);

        let tempo = beat_track_tempo(&env, frame_rate, 110.0, 100.0).unwrap();
        assert!(
            (tempo - 100.0).abs() < 8.0,
            "Expected tempo near 100, got {:.2}",
            tempo
        );
    }

    #[test]
    fn test_beat_track_flat_envelope_falls_back() {
        let env = vec![0.5f32; 500];
        let tempo = beat_track_tempo(&env, 43.0, 123.0, 100.0).unwrap();
        assert_eq!(tempo, 123.0);
    }

    #[test]
    fn test_beat_track_invalid_params() {
        let env = vec![1.0f32; 100];
        assert!(beat_track_tempo(&[], 43.0, 120.0, 100.0).is_err());
        assert!(beat_track_tempo(&env, 0.0, 120.0, 100.0).is_err());
        assert!(beat_track_tempo(&env, 43.0, -5.0, 100.0).is_err());
        assert!(beat_track_tempo(&env, 43.0, 120.0, 0.0).is_err());
    }
}
