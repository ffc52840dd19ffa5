//! Chroma profile extraction
//!
//! Folds constant-Q magnitudes into 12 pitch classes, normalizes each frame
//! by its maximum, and averages over time into a single [`ChromaProfile`].

use super::cqt::{cqt_magnitudes, CqtParams};
use super::normalization::normalize_max;
use super::ChromaProfile;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::AudioSignal;

/// Extract the time-averaged chroma profile of a signal
///
/// # Arguments
///
/// * `signal` - Mono signal, usually the harmonic component
/// * `config` - Analysis configuration (CQT and hop parameters)
///
/// # Returns
///
/// L1-normalized pitch-class profile. Silence yields the uniform profile.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the CQT parameters do not fit the
/// signal's sample rate (top bin above Nyquist, hop not divisible by the
/// decimation factor, bins per octave not a multiple of 12).
pub fn extract_chroma(signal: &AudioSignal, config: &AnalysisConfig) -> Result<ChromaProfile, AnalysisError> {
    let params = CqtParams {
        fmin: config.cqt_fmin,
        n_octaves: config.cqt_n_octaves,
        bins_per_octave: config.cqt_bins_per_octave,
        filter_scale: config.cqt_filter_scale,
        hop_size: config.hop_size,
    };

    let magnitudes = cqt_magnitudes(signal.samples(), signal.sample_rate(), &params)?;
    let frames = fold_to_chroma(&magnitudes, params.fmin, params.bins_per_octave)?;

    let mut energies = [0.0f32; 12];
    if !frames.is_empty() {
        for frame in &frames {
            for (acc, &v) in energies.iter_mut().zip(frame.iter()) {
                *acc += v;
            }
        }
        let n = frames.len() as f32;
        for e in energies.iter_mut() {
            *e /= n;
        }
    }

    let profile = ChromaProfile::from_energies(energies);
    log::debug!(
        "Chroma profile over {} frames: {:?}",
        frames.len(),
        profile.values()
    );
    Ok(profile)
}

/// Fold constant-Q magnitude frames into per-frame chroma vectors
///
/// Bin `b` is assigned to pitch class
/// `(round(b * 12 / bins_per_octave) + round(midi(fmin))) mod 12`, so the
/// three bins around each semitone share a pitch class. Each output frame is
/// max-normalized; all-zero frames stay zero.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `bins_per_octave` is not a
/// positive multiple of 12 or `fmin` is not a positive frequency.
pub fn fold_to_chroma(
    magnitudes: &[Vec<f32>],
    fmin: f32,
    bins_per_octave: usize,
) -> Result<Vec<[f32; 12]>, AnalysisError> {
    if bins_per_octave == 0 || bins_per_octave % 12 != 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Bins per octave must be a positive multiple of 12, got {}",
            bins_per_octave
        )));
    }
    if !(fmin.is_finite() && fmin > 0.0) {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid minimum frequency: {}",
            fmin
        )));
    }

    let offset = hz_to_midi(fmin).round() as i64;
    let pitch_class = |b: usize| -> usize {
        let semitone = (b as f32 * 12.0 / bins_per_octave as f32).round() as i64;
        (semitone + offset).rem_euclid(12) as usize
    };

    Ok(magnitudes
        .iter()
        .map(|row| {
            let mut chroma = [0.0f32; 12];
            for (b, &m) in row.iter().enumerate() {
                chroma[pitch_class(b)] += m;
            }
            normalize_max(&mut chroma);
            chroma
        })
        .collect())
}

fn hz_to_midi(freq: f32) -> f32 {
    12.0 * (freq / 440.0).log2() + 69.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 22050;

    fn tone(freqs: &[f32], amplitude: f32, seconds: f32) -> AudioSignal {
        let n = (SR as f32 * seconds) as usize;
        let samples = (0..n)
            .map(|i| {
                let t = i as f32 / SR as f32;
                freqs
                    .iter()
                    .map(|f| amplitude * (2.0 * std::f32::consts::PI * f * t).sin())
                    .sum::<f32>()
            })
            .collect();
        AudioSignal::new(samples, SR).unwrap()
    }

    fn argmax(values: &[f32; 12]) -> usize {
        let mut best = 0;
        for (i, &v) in values.iter().enumerate() {
            if v > values[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn test_hz_to_midi() {
        assert!((hz_to_midi(440.0) - 69.0).abs() < 1e-4);
        assert!((hz_to_midi(32.703_197) - 24.0).abs() < 1e-3);
    }

    #[test]
    fn test_fold_groups_three_bins_per_semitone() {
        // One frame, a unit magnitude in bins 35, 36, 37 (around C2) and 4 (D1)
        let mut row = vec![0.0f32; 252];
        row[35] = 1.0;
        row[36] = 1.0;
        row[37] = 1.0;
        row[4] = 1.5;
        let chroma = fold_to_chroma(&[row], 32.703_197, 36).unwrap();
        assert_eq!(chroma.len(), 1);
        assert_eq!(chroma[0][0], 1.0);
        assert_eq!(chroma[0][1], 0.5);
        assert!(chroma[0][2..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fold_zero_frame_stays_zero() {
        let chroma = fold_to_chroma(&[vec![0.0; 36]], 32.703_197, 36).unwrap();
        assert!(chroma[0].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fold_rejects_bad_resolution() {
        assert!(fold_to_chroma(&[], 32.7, 30).is_err());
        assert!(fold_to_chroma(&[], 0.0, 36).is_err());
    }

    #[test]
    fn test_a440_peaks_at_a() {
        let profile = extract_chroma(&tone(&[440.0], 0.5, 1.5), &AnalysisConfig::default()).unwrap();
        assert_eq!(argmax(profile.values()), 9);
        let sum: f32 = profile.values().iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(profile.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_scale_invariance() {
        let config = AnalysisConfig::default();
        let loud = extract_chroma(&tone(&[261.63, 329.63], 0.4, 1.0), &config).unwrap();
        let quiet = extract_chroma(&tone(&[261.63, 329.63], 0.1, 1.0), &config).unwrap();
        for (a, b) in loud.values().iter().zip(quiet.values().iter()) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_silence_is_uniform() {
        let silence = AudioSignal::new(vec![0.0; 22050], SR).unwrap();
        let profile = extract_chroma(&silence, &AnalysisConfig::default()).unwrap();
        assert!(profile.values().iter().all(|&v| v == 1.0 / 12.0));
    }
}
