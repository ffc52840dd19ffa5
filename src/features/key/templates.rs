//! Krumhansl-Schmuckler key templates
//!
//! Two tonal profiles (major and minor, rooted on C), each L1-normalized.
//! The 24 keys are obtained by rotating the chroma profile against these
//! two vectors rather than by storing 24 rotated copies.
//!
//! # Reference
//!
//! Krumhansl, C. L. (1990). *Cognitive Foundations of Musical Pitch*.
//! Oxford University Press.

use std::sync::OnceLock;

/// Probe-tone ratings for a major key, tonic first
const MAJOR_PROFILE: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Probe-tone ratings for a minor key, tonic first
const MINOR_PROFILE: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

static SHARED: OnceLock<KeyTemplates> = OnceLock::new();

/// Major and minor key templates rooted on C
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTemplates {
    /// Major profile, L1-normalized
    pub major: [f32; 12],

    /// Minor profile, L1-normalized
    pub minor: [f32; 12],
}

impl KeyTemplates {
    /// Build the templates from the Krumhansl-Schmuckler ratings
    pub fn new() -> Self {
        Self {
            major: l1_normalized(MAJOR_PROFILE),
            minor: l1_normalized(MINOR_PROFILE),
        }
    }

    /// Process-wide templates, built on first use
    pub fn shared() -> &'static KeyTemplates {
        SHARED.get_or_init(KeyTemplates::new)
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new()
    }
}

fn l1_normalized(mut profile: [f32; 12]) -> [f32; 12] {
    let sum: f64 = profile.iter().map(|&v| v as f64).sum();
    for v in profile.iter_mut() {
        *v = (*v as f64 / sum) as f32;
    }
    profile
}
