//! Key detection by template matching
//!
//! The chroma profile is rotated through all 12 pitch classes and correlated
//! (dot product) with the major and minor templates. The best rotation of
//! each mode competes; major wins ties.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use super::templates::KeyTemplates;
use super::KeyEstimate;
use crate::analysis::result::Key;
use crate::features::chroma::ChromaProfile;

/// Relative gap below which the best major and minor scores count as tied
const TIE_TOLERANCE: f32 = 1e-6;

/// Detect the musical key of a chroma profile
///
/// For each rotation `i`, the profile is shifted so that pitch class `i`
/// lands on the template's tonic, and scored against both templates.
///
/// # Arguments
///
/// * `chroma` - Time-averaged pitch-class profile
///
/// # Returns
///
/// The winning key, its score and all 24 scores
///
/// # Example
///
/// ```
/// use keytempo::features::chroma::ChromaProfile;
/// use keytempo::features::key::detect_key;
///
/// // C, E and G carry all the energy
/// let mut energies = [0.0f32; 12];
/// energies[0] = 1.0;
/// energies[4] = 1.0;
/// energies[7] = 1.0;
/// let estimate = detect_key(&ChromaProfile::from_energies(energies));
/// assert_eq!(estimate.key.label(), "C Maj");
/// ```
pub fn detect_key(chroma: &ChromaProfile) -> KeyEstimate {
    let templates = KeyTemplates::shared();

    let mut major_scores = [0.0f32; 12];
    let mut minor_scores = [0.0f32; 12];
    for i in 0..12 {
        let rotated = chroma.rotated_left(i);
        major_scores[i] = dot_product(&rotated, &templates.major);
        minor_scores[i] = dot_product(&rotated, &templates.minor);
    }

    let (key, score) = select_key(&major_scores, &minor_scores);
    log::debug!("Detected key: {} (score={:.4})", key.label(), score);

    KeyEstimate {
        key,
        score,
        major_scores,
        minor_scores,
    }
}

/// Pick the key from the 12 major and 12 minor rotation scores
///
/// Each mode's best rotation is the first index of its maximum. Major is
/// chosen unless the best minor score beats the best major one by more than
/// a relative `1e-6`, so profiles equidistant from both templates resolve
/// to major despite rounding in the templates.
pub fn select_key(major_scores: &[f32; 12], minor_scores: &[f32; 12]) -> (Key, f32) {
    let best_major = first_argmax(major_scores);
    let best_minor = first_argmax(minor_scores);
    let major = major_scores[best_major];
    let minor = minor_scores[best_minor];
    let tolerance = TIE_TOLERANCE * major.abs().max(minor.abs());

    if major >= minor - tolerance {
        (Key::major(best_major as u32), major)
    } else {
        (Key::minor(best_minor as u32), minor)
    }
}

fn first_argmax(scores: &[f32; 12]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = i;
        }
    }
    best
}

/// Accumulated in f64 so rotations of the same profile score identically
fn dot_product(a: &[f32; 12], b: &[f32; 12]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x as f64 * y as f64)
        .sum::<f64>() as f32
}
