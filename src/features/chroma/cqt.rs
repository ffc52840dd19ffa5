//! Constant-Q transform
//!
//! Log-frequency analysis with `bins_per_octave` bins per octave, each bin a
//! Hann-windowed complex exponential whose length is inversely proportional
//! to its center frequency (constant ratio of frequency to bandwidth).
//!
//! Octaves are processed from the top down. After each octave the signal is
//! low-pass filtered and decimated by two, so that every octave reuses kernels
//! of the same length (a few hundred samples) instead of the multi-second
//! kernels the lowest bins would need at the original rate.
//!
//! # Reference
//!
//! Brown, J. C. (1991). Calculation of a Constant Q Spectral Transform.
//! *Journal of the Acoustical Society of America*, 89(1), 425-434.
//!
//! Schörkhuber, C., & Klapuri, A. (2010). Constant-Q Transform Toolbox for Music Processing.
//! *Proceedings of the 7th Sound and Music Computing Conference*.

use rustfft::num_complex::Complex;

use crate::error::AnalysisError;
use crate::features::spectrum::hann_window;

/// Half-length of the decimation low-pass filter (taps = 2 * HALF + 1)
const DECIMATION_HALF_TAPS: usize = 32;

/// Constant-Q transform parameters
#[derive(Debug, Clone)]
pub struct CqtParams {
    /// Center frequency of bin 0 in Hz
    pub fmin: f32,
    /// Number of octaves
    pub n_octaves: usize,
    /// Bins per octave
    pub bins_per_octave: usize,
    /// Kernel length scale (1.0 = one bin bandwidth)
    pub filter_scale: f32,
    /// Hop size in samples at the input rate
    pub hop_size: usize,
}

impl CqtParams {
    /// Total number of bins
    pub fn n_bins(&self) -> usize {
        self.n_octaves * self.bins_per_octave
    }

    /// Center frequency of bin `k` in Hz
    pub fn frequency(&self, k: usize) -> f32 {
        self.fmin * 2.0f32.powf(k as f32 / self.bins_per_octave as f32)
    }

    /// Quality factor Q = filter_scale / (2^(1/bpo) - 1)
    pub fn quality(&self) -> f32 {
        self.filter_scale / (2.0f32.powf(1.0 / self.bins_per_octave as f32) - 1.0)
    }
}

/// Compute the constant-Q magnitude spectrogram
///
/// Frame `t` is centered on input sample `t * hop_size`; there are
/// `1 + samples.len() / hop_size` frames.
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `params` - Transform parameters
///
/// # Returns
///
/// Magnitudes as `n_frames x n_bins`, bin 0 at `params.fmin`
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the highest bin is at or above
/// Nyquist, or if `hop_size` is not divisible by `2^(n_octaves - 1)`.
pub fn cqt_magnitudes(
    samples: &[f32],
    sample_rate: u32,
    params: &CqtParams,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    validate(sample_rate, params)?;

    let n_bins = params.n_bins();
    let bpo = params.bins_per_octave;
    let n_frames = 1 + samples.len() / params.hop_size;
    let quality = params.quality();

    log::debug!(
        "CQT: {} samples at {} Hz, {} bins ({} octaves x {}), Q={:.2}, {} frames",
        samples.len(),
        sample_rate,
        n_bins,
        params.n_octaves,
        bpo,
        quality,
        n_frames
    );

    let mut magnitudes = vec![vec![0.0f32; n_bins]; n_frames];

    let mut signal = samples.to_vec();
    let mut rate = sample_rate as f32;
    let mut hop = params.hop_size;

    for octave in (0..params.n_octaves).rev() {
        for k in octave * bpo..(octave + 1) * bpo {
            let kernel = bin_kernel(params.frequency(k), rate, quality);
            for (t, row) in magnitudes.iter_mut().enumerate() {
                row[k] = apply_kernel(&signal, t * hop, &kernel).norm();
            }
        }

        if octave > 0 {
            signal = halve(&signal);
            rate /= 2.0;
            hop /= 2;
        }
    }

    Ok(magnitudes)
}

fn validate(sample_rate: u32, params: &CqtParams) -> Result<(), AnalysisError> {
    if sample_rate == 0 || params.hop_size == 0 || params.n_octaves == 0 || params.bins_per_octave == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid CQT setup: sr={}, hop={}, octaves={}, bpo={}",
            sample_rate, params.hop_size, params.n_octaves, params.bins_per_octave
        )));
    }

    let nyquist = sample_rate as f32 / 2.0;
    let f_top = params.frequency(params.n_bins() - 1);
    if f_top >= nyquist {
        return Err(AnalysisError::InvalidInput(format!(
            "Highest CQT bin ({:.1} Hz) exceeds Nyquist ({:.1} Hz)",
            f_top, nyquist
        )));
    }

    let decimation = 1usize << (params.n_octaves - 1);
    if params.hop_size % decimation != 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Hop size {} must be divisible by {} for {} octaves",
            params.hop_size, decimation, params.n_octaves
        )));
    }

    Ok(())
}

/// Windowed complex exponential for one bin, normalized by its window sum
///
/// A unit-amplitude sinusoid at `freq` produces a response of magnitude 0.5
/// regardless of kernel length.
fn bin_kernel(freq: f32, rate: f32, quality: f32) -> Vec<Complex<f32>> {
    let len = ((quality * rate / freq).ceil() as usize).max(1);
    let window = hann_window(len);
    let window_sum: f32 = window.iter().sum::<f32>().max(f32::MIN_POSITIVE);
    let center = len as f32 / 2.0;
    let omega = 2.0 * std::f32::consts::PI * freq / rate;

    window
        .iter()
        .enumerate()
        .map(|(n, &w)| {
            let phase = -omega * (n as f32 - center);
            Complex::new(phase.cos(), phase.sin()) * (w / window_sum)
        })
        .collect()
}

/// Inner product of the kernel with the signal, kernel centered on `center`
fn apply_kernel(signal: &[f32], center: usize, kernel: &[Complex<f32>]) -> Complex<f32> {
    let start = center as isize - (kernel.len() / 2) as isize;
    let lo = (-start).max(0) as usize;
    let hi = ((signal.len() as isize - start).max(0) as usize).min(kernel.len());

    let mut acc = Complex::new(0.0f32, 0.0f32);
    for n in lo..hi {
        acc += kernel[n] * signal[(start + n as isize) as usize];
    }
    acc
}

/// Low-pass filter at half the Nyquist rate and keep every other sample
///
/// The filter is a Hann-windowed sinc applied symmetrically (zero phase), so
/// output sample `j` stays aligned with input sample `2j`.
fn halve(signal: &[f32]) -> Vec<f32> {
    let taps = lowpass_taps();
    let half = DECIMATION_HALF_TAPS as isize;
    let n = signal.len() as isize;

    (0..signal.len().div_ceil(2))
        .map(|j| {
            let center = 2 * j as isize;
            let mut acc = 0.0f32;
            for (m, &h) in taps.iter().enumerate() {
                let idx = center + half - m as isize;
                if idx >= 0 && idx < n {
                    acc += h * signal[idx as usize];
                }
            }
            acc
        })
        .collect()
}

fn lowpass_taps() -> Vec<f32> {
    let len = 2 * DECIMATION_HALF_TAPS + 1;
    let half = DECIMATION_HALF_TAPS as f32;
    let mut taps: Vec<f32> = (0..len)
        .map(|i| {
            let x = i as f32 - half;
            // Cutoff at 0.25 cycles/sample
            let sinc = if x == 0.0 {
                1.0
            } else {
                let arg = std::f32::consts::PI * 0.5 * x;
                arg.sin() / arg
            };
            let window = 0.5 - 0.5 * (std::f32::consts::PI * i as f32 / half).cos();
            0.5 * sinc * window
        })
        .collect();
    let sum: f32 = taps.iter().sum();
    for h in taps.iter_mut() {
        *h /= sum;
    }
    taps
}
