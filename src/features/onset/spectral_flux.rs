//! Log-power spectral flux onset strength
//!
//! The power spectrogram is converted to decibels, clipped to a fixed dynamic
//! range below its global maximum, and differenced along time. Only increases
//! in energy count; the per-bin increases are averaged into one value per
//! frame.
//!
//! # Reference
//!
//! Böck, S., & Widmer, G. (2013). Maximum Filter Vibrato Suppression for Onset Detection.
//! *Proceedings of the 16th International Conference on Digital Audio Effects (DAFx-13)*.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::spectrum::stft;
use crate::io::AudioSignal;

/// Smallest power before conversion to decibels
const AMIN: f32 = 1e-10;

/// Compute the onset strength envelope of a signal
///
/// # Arguments
///
/// * `signal` - Mono signal
/// * `config` - Analysis configuration (`frame_size`, `hop_size`, `onset_top_db`)
///
/// # Returns
///
/// One non-negative value per STFT frame (`1 + len / hop_size` values),
/// the first of which is 0
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the STFT parameters are invalid.
pub fn onset_strength(signal: &AudioSignal, config: &AnalysisConfig) -> Result<Vec<f32>, AnalysisError> {
    let spec = stft(signal.samples(), config.frame_size, config.hop_size)?;
    let envelope = onset_strength_from_power(&spec.powers(), config.onset_top_db);
    log::debug!(
        "Onset strength: {} frames, peak {:.3}",
        envelope.len(),
        envelope.iter().copied().fold(0.0f32, f32::max)
    );
    Ok(envelope)
}

/// Onset strength from a power spectrogram (n_frames x n_bins)
///
/// `envelope[t] = mean_k max(0, dB[t][k] - dB[t-1][k])`, `envelope[0] = 0`.
pub fn onset_strength_from_power(powers: &[Vec<f32>], top_db: f32) -> Vec<f32> {
    let db = power_to_db(powers, top_db);

    let mut envelope = vec![0.0f32; db.len()];
    for t in 1..db.len() {
        let n_bins = db[t].len().min(db[t - 1].len());
        if n_bins == 0 {
            continue;
        }
        let flux: f32 = db[t]
            .iter()
            .zip(db[t - 1].iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
        envelope[t] = flux / n_bins as f32;
    }
    envelope
}

/// Convert power to decibels, floored at `top_db` below the global maximum
fn power_to_db(powers: &[Vec<f32>], top_db: f32) -> Vec<Vec<f32>> {
    let mut db: Vec<Vec<f32>> = powers
        .iter()
        .map(|frame| frame.iter().map(|&p| 10.0 * p.max(AMIN).log10()).collect())
        .collect();

    let max_db = db
        .iter()
        .flat_map(|frame| frame.iter().copied())
        .fold(f32::NEG_INFINITY, f32::max);
    if max_db.is_finite() {
        let floor = max_db - top_db;
        for v in db.iter_mut().flat_map(|frame| frame.iter_mut()) {
            *v = v.max(floor);
        }
    }
    db
}
