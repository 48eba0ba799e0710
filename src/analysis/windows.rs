//! Analysis window selection
//!
//! Derives the excerpt windows sampled from a track: a window length scaled
//! to the track duration (clamped to a fixed range) and three offsets at
//! fixed fractions of the duration, sampling the early, middle, and late
//! portions while avoiding pure intros and outros.

use crate::config::EstimatorConfig;

/// Excerpt windows for one track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisWindows {
    /// Length of every excerpt in seconds
    pub window_seconds: f32,

    /// Excerpt start offsets in seconds
    pub offsets: [f32; 3],
}

/// Select the analysis windows for a track
///
/// `window_seconds = clamp(duration * window_scale, min, max)`, offsets at
/// the configured fractions of the duration. Deterministic: identical input
/// always yields identical windows.
///
/// Callers must not invoke this for non-positive durations; a track with
/// no duration short-circuits to an absent estimate before window selection.
pub fn select_windows(total_duration_seconds: f32, config: &EstimatorConfig) -> AnalysisWindows {
    let window_seconds = (total_duration_seconds * config.window_scale)
        .clamp(config.min_window_seconds, config.max_window_seconds);

    let offsets = [
        total_duration_seconds * config.window_offsets[0],
        total_duration_seconds * config.window_offsets[1],
        total_duration_seconds * config.window_offsets[2],
    ];

    log::debug!(
        "Selected windows: {:.1}s at offsets [{:.1}, {:.1}, {:.1}] for {:.1}s track",
        window_seconds,
        offsets[0],
        offsets[1],
        offsets[2],
        total_duration_seconds
    );

    AnalysisWindows {
        window_seconds,
        offsets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_for_ten_minute_track() {
        let windows = select_windows(600.0, &EstimatorConfig::default());
        assert!((windows.window_seconds - 96.0).abs() < 1e-3);
        for (actual, expected) in windows.offsets.iter().zip([60.0, 276.0, 468.0]) {
            assert!(
                (actual - expected).abs() < 1e-3,
                "Offset {} should be {}",
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_short_track_clamps_to_min_window() {
        // 30 * 0.16 = 4.8 clamps up to the 90s floor
        let windows = select_windows(30.0, &EstimatorConfig::default());
        assert_eq!(windows.window_seconds, 90.0);
    }

    #[test]
    fn test_long_track_clamps_to_max_window() {
        let windows = select_windows(2000.0, &EstimatorConfig::default());
        assert_eq!(windows.window_seconds, 180.0);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let config = EstimatorConfig::default();
        let a = select_windows(432.5, &config);
        let b = select_windows(432.5, &config);
        assert_eq!(a, b);
    }
}
