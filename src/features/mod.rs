//! Feature extraction modules
//!
//! This module contains all feature extraction algorithms:
//! - Spectral analysis (STFT / inverse STFT)
//! - Harmonic-percussive separation
//! - Onset strength
//! - Period estimation (BPM detection)
//! - Chroma extraction
//! - Key detection

pub mod chroma;
pub mod hpss;
pub mod key;
pub mod onset;
pub mod period;
pub mod spectrum;
