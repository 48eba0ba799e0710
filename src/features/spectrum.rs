//! STFT magnitude spectrogram computation
//!
//! Short-time Fourier transform with a Hann window, producing the magnitude
//! frames consumed by harmonic/percussive separation and the onset-strength
//! envelope.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::EstimateError;

/// Compute an STFT magnitude spectrogram
///
/// Frames the signal with a Hann window and returns one magnitude spectrum
/// per frame (`frame_size / 2 + 1` bins, DC through Nyquist).
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_size` - FFT frame size (power of two, typical: 2048)
/// * `hop_size` - Hop size in samples (typical: 512)
///
/// # Returns
///
/// Magnitude spectrogram as `Vec<Vec<f32>>` (n_frames × n_bins). Signals
/// shorter than one frame produce an empty spectrogram.
///
/// # Errors
///
/// Returns `EstimateError::InvalidInput` if `frame_size` or `hop_size` is 0.
pub fn compute_stft(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<Vec<f32>>, EstimateError> {
    if frame_size == 0 {
        return Err(EstimateError::InvalidInput(
            "Frame size must be > 0".to_string(),
        ));
    }

    if hop_size == 0 {
        return Err(EstimateError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    if samples.len() < frame_size {
        return Ok(Vec::new());
    }

    let n_frames = (samples.len() - frame_size) / hop_size + 1;
    let n_bins = frame_size / 2 + 1;

    log::debug!(
        "Computing STFT: {} samples, frame_size={}, hop_size={}, {} frames",
        samples.len(),
        frame_size,
        hop_size,
        n_frames
    );

    // Periodic Hann window
    let window: Vec<f32> = (0..frame_size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / frame_size as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(frame_size);

    let mut magnitudes = Vec::with_capacity(n_frames);
    let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); frame_size];

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_size;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex::new(samples[start + i] * window[i], 0.0);
        }

        fft.process(&mut buffer);

        let mags: Vec<f32> = buffer[..n_bins].iter().map(|c| c.norm()).collect();
        magnitudes.push(mags);
    }

    Ok(magnitudes)
}
