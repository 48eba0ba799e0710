//! Onset analysis modules
//!
//! Percussive-component onset-strength extraction:
//! - Harmonic/percussive separation (median filtering)
//! - Mel onset-strength envelope with median aggregation

pub mod hpss;
pub mod strength;
