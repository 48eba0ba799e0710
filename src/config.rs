//! Configuration parameters for tempo estimation

/// Tempo estimation configuration parameters
///
/// Every tunable policy value of the pipeline lives here so the windowing
/// heuristics, octave correction thresholds, and aggregation policy stay
/// visible and testable in isolation.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    // Audio loading
    /// Fixed analysis sample rate in Hz (default: 22050)
    /// Every decoded segment is resampled to this rate before analysis
    pub analysis_sample_rate: u32,

    // STFT parameters
    /// Frame size for STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size for STFT (default: 512)
    pub hop_size: usize,

    // Onset-strength envelope
    /// Number of mel bands for the onset-strength envelope (default: 128)
    pub n_mels: usize,

    /// Minimum decoded segment length in seconds (default: 20.0)
    /// Shorter segments are rejected as too short for a stable tempo
    pub min_segment_seconds: f32,

    /// Minimum onset envelope length in frames (default: 8)
    pub min_envelope_frames: usize,

    // Window selection
    /// Fraction of total track duration used as the window length (default: 0.16)
    pub window_scale: f32,

    /// Lower bound on window length in seconds (default: 90.0)
    pub min_window_seconds: f32,

    /// Upper bound on window length in seconds (default: 180.0)
    pub max_window_seconds: f32,

    /// Excerpt offsets as fractions of total duration (default: [0.10, 0.46, 0.78])
    /// Samples the early, middle, and late portions while avoiding intros/outros
    pub window_offsets: [f32; 3],

    // Octave folding
    /// Lower bound of the canonical tempo range in BPM (default: 75.0)
    pub fold_min_bpm: f32,

    /// Upper bound of the canonical tempo range in BPM, exclusive (default: 190.0)
    pub fold_max_bpm: f32,

    // Tempo estimation
    /// Center of the log-normal tempo prior in BPM (default: 120.0)
    pub start_bpm: f32,

    /// Tempogram column length in envelope frames (default: 384, ~8.9 s at 43 fps)
    pub tempogram_window_frames: usize,

    /// Transition-cost weight for the beat tracker (default: 100.0)
    /// Higher values penalize deviation from the seeded beat period harder
    pub beat_tightness: f32,

    // HPSS
    /// Median filter length for harmonic/percussive separation (default: 31)
    pub hpss_kernel: usize,

    /// Soft-mask exponent for harmonic/percussive separation (default: 2.0)
    pub hpss_power: f32,

    // Aggregation
    /// Cross-window spread in BPM at which confidence saturates to 0 (default: 18.0)
    pub confidence_spread_bpm: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            analysis_sample_rate: 22050,
            frame_size: 2048,
            hop_size: 512,
            n_mels: 128,
            min_segment_seconds: 20.0,
            min_envelope_frames: 8,
            window_scale: 0.16,
            min_window_seconds: 90.0,
            max_window_seconds: 180.0,
            window_offsets: [0.10, 0.46, 0.78],
            fold_min_bpm: 75.0,
            fold_max_bpm: 190.0,
            start_bpm: 120.0,
            tempogram_window_frames: 384,
            beat_tightness: 100.0,
            hpss_kernel: 31,
            hpss_power: 2.0,
            confidence_spread_bpm: 18.0,
        }
    }
}
