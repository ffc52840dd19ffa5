//! Key detection modules
//!
//! Detect musical key using:
//! - Krumhansl-Schmuckler templates (major and minor)
//! - Rotation-based template matching over 24 keys

pub mod detector;
pub mod templates;

pub use detector::{detect_key, select_key};
pub use templates::KeyTemplates;

use crate::analysis::result::Key;

/// Key detection result
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    /// Detected key (best match)
    pub key: Key,

    /// Template correlation of the detected key
    pub score: f32,

    /// Correlation with the major template for each tonic (0 = C)
    pub major_scores: [f32; 12],

    /// Correlation with the minor template for each tonic (0 = C)
    pub minor_scores: [f32; 12],
}
