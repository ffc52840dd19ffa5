//! Harmonic-percussive source separation (HPSS)
//!
//! Median-filtering separation: sustained tones form horizontal ridges in a
//! magnitude spectrogram, transients form vertical ones. Filtering along time
//! enhances the former, filtering along frequency the latter. A soft mask
//! built from the two estimates is applied to the complex STFT, which is then
//! inverted back to a waveform.
//!
//! # Reference
//!
//! Fitzgerald, D. (2010). Harmonic/Percussive Separation Using Median Filtering.
//! *Proceedings of the 13th International Conference on Digital Audio Effects (DAFx-10)*.
//!
//! Driedger, J., Müller, M., & Disch, S. (2014). Extending Harmonic-Percussive Separation
//! of Audio Signals. *Proceedings of ISMIR*.

use super::spectrum::{istft, stft};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::AudioSignal;

/// Values below this are treated as zero when building the soft mask
const TINY: f32 = f32::MIN_POSITIVE;

/// Decompose a magnitude spectrogram into harmonic and percussive estimates
///
/// # Arguments
///
/// * `magnitude_spec` - Magnitude spectrogram (n_frames x n_bins)
/// * `kernel_size` - Median filter length, in frames for the harmonic
///   estimate and in bins for the percussive estimate
///
/// # Returns
///
/// Tuple of (harmonic, percussive) spectrograms with the input's shape
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the frames have inconsistent
/// lengths or `kernel_size` is zero.
pub fn hpss_decompose(
    magnitude_spec: &[Vec<f32>],
    kernel_size: usize,
) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>), AnalysisError> {
    if kernel_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "HPSS kernel size must be > 0".to_string(),
        ));
    }
    if magnitude_spec.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let n_frames = magnitude_spec.len();
    let n_bins = magnitude_spec[0].len();
    for (i, frame) in magnitude_spec.iter().enumerate() {
        if frame.len() != n_bins {
            return Err(AnalysisError::InvalidInput(format!(
                "Inconsistent frame lengths: frame 0 has {} bins, frame {} has {} bins",
                n_bins,
                i,
                frame.len()
            )));
        }
    }

    log::debug!(
        "Decomposing spectrogram with HPSS: {} frames x {} bins, kernel={}",
        n_frames,
        n_bins,
        kernel_size
    );

    let mut scratch = Vec::with_capacity(kernel_size);

    // Harmonic: median along time, per bin
    let mut harmonic = vec![vec![0.0f32; n_bins]; n_frames];
    let mut series = vec![0.0f32; n_frames];
    for k in 0..n_bins {
        for (t, frame) in magnitude_spec.iter().enumerate() {
            series[t] = frame[k];
        }
        for (t, row) in harmonic.iter_mut().enumerate() {
            row[k] = median_at(&series, t, kernel_size, &mut scratch);
        }
    }

    // Percussive: median along frequency, per frame
    let percussive = magnitude_spec
        .iter()
        .map(|frame| {
            (0..n_bins)
                .map(|k| median_at(frame, k, kernel_size, &mut scratch))
                .collect()
        })
        .collect();

    Ok((harmonic, percussive))
}

/// Soft mask for the `target` component against `reference`
///
/// `mask = target^p / (target^p + reference^p)`, computed relative to the
/// larger of the two to avoid overflow. Cells where both are ~0 get 0.
pub fn softmask(target: f32, reference: f32, power: f32) -> f32 {
    let z = target.max(reference);
    if z < TINY {
        return 0.0;
    }
    let m = (target / z).powf(power);
    let r = (reference / z).powf(power);
    m / (m + r)
}

/// Extract the harmonic component of a signal
///
/// Returns a new signal with the same length and sample rate in which
/// percussive transients are attenuated. Silence maps to silence.
///
/// # Errors
///
/// Returns `AnalysisError` if the STFT parameters in `config` are invalid.
pub fn harmonic(signal: &AudioSignal, config: &AnalysisConfig) -> Result<AudioSignal, AnalysisError> {
    if signal.is_empty() {
        return Ok(signal.clone());
    }

    let mut spec = stft(signal.samples(), config.frame_size, config.hop_size)?;
    let magnitudes = spec.magnitudes();
    let (harm, perc) = hpss_decompose(&magnitudes, config.hpss_kernel_size)?;

    let margin = config.hpss_margin;
    let power = config.hpss_power;
    for ((frame, h_row), p_row) in spec.frames.iter_mut().zip(harm.iter()).zip(perc.iter()) {
        for ((z, &h), &p) in frame.iter_mut().zip(h_row.iter()).zip(p_row.iter()) {
            *z *= softmask(h, p * margin, power);
        }
    }

    let samples = istft(&spec, signal.len())?;
    log::debug!("Harmonic component extracted: {} samples", samples.len());

    Ok(signal.with_samples(samples))
}

/// Median of the window of `size` values centered on `center`
///
/// Out-of-range positions are mirrored about the edges with the edge value
/// repeated (`d c b a | a b c d | d c b a`).
fn median_at(values: &[f32], center: usize, size: usize, scratch: &mut Vec<f32>) -> f32 {
    let n = values.len() as isize;
    let half = (size / 2) as isize;
    let start = center as isize - half;

    scratch.clear();
    for offset in 0..size as isize {
        scratch.push(values[reflect_index(start + offset, n)]);
    }

    let mid = size / 2;
    let (_, median, _) =
        scratch.select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    *median
}

fn reflect_index(mut i: isize, n: isize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * n;
    i = i.rem_euclid(period);
    if i >= n {
        i = period - 1 - i;
    }
    i as usize
}
