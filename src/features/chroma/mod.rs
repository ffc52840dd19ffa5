//! Chroma extraction modules
//!
//! Extract the pitch-class distribution (12 semitones) of a whole signal:
//! - Constant-Q transform
//! - Folding CQT bins into pitch classes
//! - Per-frame and profile normalization

pub mod cqt;
pub mod extractor;
pub mod normalization;

pub use extractor::{extract_chroma, fold_to_chroma};

use serde::{Deserialize, Serialize};

/// Pitch-class names in ascending semitone order from C
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Time-averaged, L1-normalized pitch-class energy profile
///
/// Index 0 is C, index 11 is B. Entries are in [0, 1] and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChromaProfile([f32; 12]);

impl ChromaProfile {
    /// Build a profile from raw pitch-class energies
    ///
    /// Negative and non-finite energies are treated as zero. The result is
    /// L1-normalized; an all-zero input (silence) becomes the uniform profile
    /// with 1/12 in every pitch class.
    pub fn from_energies(energies: [f32; 12]) -> Self {
        let mut values = energies.map(|e| if e.is_finite() && e > 0.0 { e } else { 0.0 });
        if !normalization::normalize_l1(&mut values) {
            log::debug!("Chroma energy is zero, falling back to the uniform profile");
            values = [1.0 / 12.0; 12];
        }
        Self(values)
    }

    /// The 12 pitch-class values
    pub fn values(&self) -> &[f32; 12] {
        &self.0
    }

    /// Circular shift to the left by `steps`: `out[j] = self[(j + steps) % 12]`
    ///
    /// Rotating by `i` puts pitch class `i` at index 0.
    pub fn rotated_left(&self, steps: usize) -> [f32; 12] {
        let mut out = [0.0f32; 12];
        for (j, slot) in out.iter_mut().enumerate() {
            *slot = self.0[(j + steps) % 12];
        }
        out
    }

    /// Circular shift to the right by `steps`: `out[(j + steps) % 12] = self[j]`
    pub fn transposed(&self, steps: usize) -> Self {
        let mut out = [0.0f32; 12];
        for (j, &v) in self.0.iter().enumerate() {
            out[(j + steps) % 12] = v;
        }
        Self(out)
    }
}
