//! Feature extraction modules

pub mod onset;
pub mod spectrum;
pub mod tempo;
