//! Autocorrelation tempogram
//!
//! Local autocorrelation of the onset strength envelope. Each onset frame is
//! the center of a Hann-weighted window; the window's autocorrelation is
//! normalized by its lag-0 value, and the frames are averaged into a single
//! global tempogram indexed by lag (in onset frames).
//!
//! # Reference
//!
//! Grosche, P., Müller, M., & Kurth, F. (2010). Cyclic Tempogram - A Mid-level Tempo
//! Representation for Music Signals. *Proceedings of IEEE ICASSP*.

use super::autocorrelation::Autocorrelator;
use crate::error::AnalysisError;
use crate::features::spectrum::hann_window;

/// Below this lag-0 energy a frame is left unnormalized
const EPSILON: f32 = 1e-10;

/// Compute the time-averaged autocorrelation tempogram
///
/// The envelope is padded by `win_length / 2` frames on each side with a
/// linear ramp down to zero, so every onset frame gets a centered window.
///
/// # Arguments
///
/// * `onset_envelope` - Onset strength, one value per frame
/// * `win_length` - Window length in onset frames
///
/// # Returns
///
/// Mean normalized autocorrelation for lags `0..win_length`
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `win_length < 2` or the envelope
/// is empty.
pub fn global_tempogram(onset_envelope: &[f32], win_length: usize) -> Result<Vec<f32>, AnalysisError> {
    if win_length < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "Tempogram window must span at least 2 frames, got {}",
            win_length
        )));
    }
    if onset_envelope.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Empty onset envelope".to_string(),
        ));
    }

    let padded = pad_linear_ramp(onset_envelope, win_length / 2);
    let n_frames = padded.len() + 1 - win_length;
    let window = hann_window(win_length);

    log::debug!(
        "Tempogram: {} onset frames, window={} frames, {} windows",
        onset_envelope.len(),
        win_length,
        n_frames
    );

    let mut autocorrelator = Autocorrelator::new(win_length)?;
    let mut frame = vec![0.0f32; win_length];
    let mut acf = vec![0.0f32; win_length];
    let mut mean = vec![0.0f32; win_length];

    for t in 0..n_frames {
        for ((f, &x), &w) in frame.iter_mut().zip(padded[t..t + win_length].iter()).zip(window.iter()) {
            *f = x * w;
        }
        autocorrelator.process(&frame, &mut acf)?;

        let norm = acf[0];
        if norm > EPSILON {
            for (m, &a) in mean.iter_mut().zip(acf.iter()) {
                *m += a / norm;
            }
        } else {
            for (m, &a) in mean.iter_mut().zip(acf.iter()) {
                *m += a;
            }
        }
    }

    let scale = 1.0 / n_frames as f32;
    for m in mean.iter_mut() {
        *m *= scale;
    }
    Ok(mean)
}

/// Pad both ends with `pad` values ramping linearly between 0 and the edge value
fn pad_linear_ramp(values: &[f32], pad: usize) -> Vec<f32> {
    let first = values[0];
    let last = values[values.len() - 1];

    let mut out = Vec::with_capacity(values.len() + 2 * pad);
    out.extend((0..pad).map(|i| first * i as f32 / pad as f32));
    out.extend_from_slice(values);
    out.extend((0..pad).map(|i| last * (pad - 1 - i) as f32 / pad as f32));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_linear_ramp() {
        let padded = pad_linear_ramp(&[4.0, 1.0, 8.0], 4);
        assert_eq!(padded.len(), 11);
        assert_eq!(&padded[..4], &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(&padded[4..7], &[4.0, 1.0, 8.0]);
        assert_eq!(&padded[7..], &[6.0, 4.0, 2.0, 0.0]);
    }

    #[test]
    fn test_lag_zero_is_one_for_active_signal() {
        let mut env = vec![0.0f32; 200];
        for i in (0..200).step_by(10) {
            env[i] = 1.0;
        }
        let tg = global_tempogram(&env, 64).unwrap();
        assert_eq!(tg.len(), 64);
        assert!((tg[0] - 1.0).abs() < 1e-4);
        // Periodicity shows up at the pulse period and its multiples
        assert!(tg[10] > tg[5]);
        assert!(tg[20] > tg[15]);
    }

    #[test]
    fn test_silence_is_zero() {
        let tg = global_tempogram(&[0.0; 50], 16).unwrap();
        assert!(tg.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(global_tempogram(&[], 16).is_err());
        assert!(global_tempogram(&[1.0; 10], 1).is_err());
    }
}
