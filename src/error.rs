//! Error types for the tempo estimation engine

use std::fmt;

/// Errors that can occur during tempo estimation
#[derive(Debug, Clone)]
pub enum EstimateError {
    /// Invalid input parameters
    InvalidInput(String),

    /// Audio decoding error
    DecodingError(String),

    /// Processing error during analysis
    ProcessingError(String),

    /// Numerical error (overflow, underflow, etc.)
    NumericalError(String),

    /// A tempo candidate was zero, negative, or non-finite and cannot be
    /// folded into the canonical octave range
    InvalidTempo(f32),
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            EstimateError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            EstimateError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            EstimateError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            EstimateError::InvalidTempo(bpm) => {
                write!(f, "Invalid tempo candidate: {} BPM", bpm)
            }
        }
    }
}

impl std::error::Error for EstimateError {}
