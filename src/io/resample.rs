//! Sample-rate conversion to the fixed analysis rate

use rubato::{FftFixedIn, Resampler};

use crate::error::EstimateError;

/// Input chunk size for the FFT resampler
const CHUNK_SIZE: usize = 1024;

/// Resample a mono signal to `target_sr`
///
/// Passes the signal through an FFT-based resampler in fixed-size chunks,
/// zero-padding the final partial chunk. A signal already at the target rate
/// is returned unchanged.
///
/// # Arguments
///
/// * `samples` - Mono input samples
/// * `source_sr` - Input sample rate in Hz
/// * `target_sr` - Output sample rate in Hz
///
/// # Errors
///
/// Returns `EstimateError::ProcessingError` if the resampler rejects the
/// rate pair or a chunk fails to convert.
pub fn resample(samples: &[f32], source_sr: u32, target_sr: u32) -> Result<Vec<f32>, EstimateError> {
    if source_sr == 0 || target_sr == 0 {
        return Err(EstimateError::InvalidInput(format!(
            "Invalid resample rates: {} -> {}",
            source_sr, target_sr
        )));
    }

    if source_sr == target_sr || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    log::debug!(
        "Resampling {} samples: {} Hz -> {} Hz",
        samples.len(),
        source_sr,
        target_sr
    );

    let mut resampler =
        FftFixedIn::<f32>::new(source_sr as usize, target_sr as usize, CHUNK_SIZE, 2, 1).map_err(
            |e| EstimateError::ProcessingError(format!("Resampler init failed: {}", e)),
        )?;

    let mut output_buffer = vec![vec![0.0f32; resampler.output_frames_max()]; 1];
    let mut resampled = Vec::with_capacity(
        (samples.len() as u64 * target_sr as u64 / source_sr as u64) as usize + CHUNK_SIZE,
    );

    for chunk in samples.chunks(CHUNK_SIZE) {
        let input: Vec<Vec<f32>> = if chunk.len() == CHUNK_SIZE {
            vec![chunk.to_vec()]
        } else {
            let mut padded = chunk.to_vec();
            padded.resize(CHUNK_SIZE, 0.0);
            vec![padded]
        };

        let (_, out_len) = resampler
            .process_into_buffer(&input, &mut output_buffer, None)
            .map_err(|e| EstimateError::ProcessingError(format!("Resampling failed: {}", e)))?;
        resampled.extend_from_slice(&output_buffer[0][..out_len]);
    }

    Ok(resampled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_identity_rate() {
        let samples = vec![0.25f32; 1000];
        let out = resample(&samples, 22050, 22050).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples = vec![0.5f32; 44100];
        let out = resample(&samples, 44100, 22050).unwrap();

        let expected = samples.len() / 2;
        let tolerance = CHUNK_SIZE;
        assert!(
            (out.len() as i64 - expected as i64).unsigned_abs() as usize <= tolerance,
            "Expected ~{} samples, got {}",
            expected,
            out.len()
        );
    }

    #[test]
    fn test_resample_preserves_tone() {
        // A 440 Hz tone should still cross zero ~880 times/s after resampling
        let source_sr = 44100u32;
        let samples: Vec<f32> = (0..source_sr)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / source_sr as f32).sin())
            .collect();

        let out = resample(&samples, source_sr, 22050).unwrap();

        let crossings = out
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count();
        assert!(
            (crossings as i64 - 880).abs() < 90,
            "Expected ~880 zero crossings, got {}",
            crossings
        );
    }

    #[test]
    fn test_resample_invalid_rates() {
        let samples = vec![0.0f32; 100];
        assert!(resample(&samples, 0, 22050).is_err());
        assert!(resample(&samples, 44100, 0).is_err());
    }

    #[test]
    fn test_resample_empty() {
        let out = resample(&[], 44100, 22050).unwrap();
        assert!(out.is_empty());
    }
}
