//! # Cadence DSP
//!
//! A tempo estimation engine for media catalogs: samples several excerpts of
//! a track, derives two tempo candidates per excerpt from its percussive
//! onset content, and combines the excerpt estimates into one robust BPM
//! with a confidence score.
//!
//! ## Features
//!
//! - **Windowed sampling**: three duration-scaled excerpts across the track
//! - **Dual estimation**: tempogram estimate + beat-track-derived estimate
//!   per excerpt, octave-folded into a canonical range and averaged
//! - **Robust aggregation**: median across excerpts, with a spread-based
//!   confidence score
//! - **Catalog updating**: batch-writes estimates back into a station
//!   catalog JSON file
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use cadence_dsp::{estimate_bpm, EstimatorConfig};
//!
//! let config = EstimatorConfig::default();
//! match estimate_bpm(Path::new("track.mp3"), &config)? {
//!     Some(estimate) => {
//!         println!("BPM: {:.1} (confidence: {:.2})", estimate.bpm, estimate.confidence)
//!     }
//!     None => println!("No usable tempo estimate"),
//! }
//! # Ok::<(), cadence_dsp::EstimateError>(())
//! ```
//!
//! ## Architecture
//!
//! The estimation pipeline follows this flow:
//!
//! ```text
//! Track → Window Selection → (per window) Decode → HPSS → Onset Envelope
//!       → Tempo Candidates → Octave Fold → Window BPM → Aggregation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod features;
pub mod io;

// Re-export main types
pub use analysis::result::TempoEstimate;
pub use config::EstimatorConfig;
pub use error::EstimateError;

use std::path::Path;

/// Estimate the tempo of a track
///
/// Probes the track duration, selects three excerpt windows, estimates a
/// BPM for each, and aggregates the valid estimates into a median BPM with
/// a spread-based confidence score.
///
/// # Arguments
///
/// * `path` - Track file path
/// * `config` - Estimation parameters
///
/// # Returns
///
/// * `Ok(Some(estimate))` - at least one window produced a usable BPM
/// * `Ok(None)` - the track has no positive duration or no window produced
///   an estimate; callers should treat the confidence of an absent result
///   as 0.0
///
/// # Errors
///
/// Returns `EstimateError` if the track cannot be probed at all. Failures
/// inside individual windows (corrupt packets, unusable excerpts) are
/// logged and converted to absence instead.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use cadence_dsp::{estimate_bpm, EstimatorConfig};
///
/// let estimate = estimate_bpm(Path::new("track.mp3"), &EstimatorConfig::default())?;
/// # Ok::<(), cadence_dsp::EstimateError>(())
/// ```
pub fn estimate_bpm(
    path: &Path,
    config: &EstimatorConfig,
) -> Result<Option<TempoEstimate>, EstimateError> {
    let duration = io::decoder::track_duration(path)?;

    log::debug!("Estimating BPM for {:?}: duration {:.2}s", path, duration);

    if duration <= 0.0 {
        return Ok(None);
    }

    let windows = analysis::windows::select_windows(duration as f32, config);

    let mut estimates: Vec<f32> = Vec::with_capacity(windows.offsets.len());
    for &offset in &windows.offsets {
        match analysis::window::estimate_window(path, offset, windows.window_seconds, config) {
            Ok(Some(bpm)) => estimates.push(bpm),
            Ok(None) => {
                log::debug!("Window at {:.1}s produced no estimate", offset);
            }
            Err(err) => {
                log::warn!("Window at {:.1}s failed: {}", offset, err);
            }
        }
    }

    Ok(analysis::aggregate::aggregate(&estimates, config))
}
