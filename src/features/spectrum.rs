//! Short-time Fourier transform and its inverse
//!
//! Frames are centered: the signal is zero-padded by `frame_size / 2` on both
//! sides so that frame `t` is centered on sample `t * hop_size`. A periodic
//! Hann window is used for analysis and synthesis.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Complex spectrogram, `frames[t][k]` for frame `t` and bin `k`
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// One-sided spectra (`frame_size / 2 + 1` bins per frame)
    pub frames: Vec<Vec<Complex<f32>>>,

    /// FFT size used to compute the spectra
    pub frame_size: usize,

    /// Hop size between frames in samples
    pub hop_size: usize,
}

impl Spectrogram {
    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of frequency bins per frame
    pub fn n_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Magnitude spectrogram (n_frames x n_bins)
    pub fn magnitudes(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|z| z.norm()).collect())
            .collect()
    }

    /// Power spectrogram (n_frames x n_bins)
    pub fn powers(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|z| z.norm_sqr()).collect())
            .collect()
    }
}

/// Periodic Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos())
        .collect()
}

/// Compute the centered STFT of `samples`
///
/// Produces `1 + samples.len() / hop_size` frames.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `frame_size < 2` or `hop_size == 0`.
pub fn stft(samples: &[f32], frame_size: usize, hop_size: usize) -> Result<Spectrogram, AnalysisError> {
    if frame_size < 2 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid STFT parameters: frame_size={}, hop_size={}",
            frame_size, hop_size
        )));
    }

    let pad = frame_size / 2;
    let n_frames = 1 + samples.len() / hop_size;
    let n_bins = frame_size / 2 + 1;
    let window = hann_window(frame_size);

    log::debug!(
        "STFT: {} samples, frame={}, hop={}, {} frames",
        samples.len(),
        frame_size,
        hop_size,
        n_frames
    );

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);
    let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    let mut buffer = vec![Complex::new(0.0f32, 0.0f32); frame_size];

    let mut frames = Vec::with_capacity(n_frames);
    for t in 0..n_frames {
        // Sample index of buffer[0] in the unpadded signal
        let origin = (t * hop_size) as isize - pad as isize;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let idx = origin + i as isize;
            let x = if idx >= 0 && (idx as usize) < samples.len() {
                samples[idx as usize]
            } else {
                0.0
            };
            *slot = Complex::new(x * window[i], 0.0);
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        frames.push(buffer[..n_bins].to_vec());
    }

    Ok(Spectrogram {
        frames,
        frame_size,
        hop_size,
    })
}

/// Invert a centered STFT by weighted overlap-add
///
/// The output is normalized by the summed squared synthesis window and
/// trimmed (or zero-extended) to `length` samples.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if a frame has the wrong number of bins.
pub fn istft(spec: &Spectrogram, length: usize) -> Result<Vec<f32>, AnalysisError> {
    let frame_size = spec.frame_size;
    let hop_size = spec.hop_size;
    let n_bins = spec.n_bins();
    let pad = frame_size / 2;

    if frame_size < 2 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid STFT parameters: frame_size={}, hop_size={}",
            frame_size, hop_size
        )));
    }

    let window = hann_window(frame_size);
    let padded_len = (spec.n_frames().saturating_sub(1)) * hop_size + frame_size;
    let mut output = vec![0.0f32; padded_len];
    let mut window_sum = vec![0.0f32; padded_len];

    let mut planner = FftPlanner::<f32>::new();
    let ifft = planner.plan_fft_inverse(frame_size);
    let mut scratch = vec![Complex::new(0.0, 0.0); ifft.get_inplace_scratch_len()];
    let mut buffer = vec![Complex::new(0.0f32, 0.0f32); frame_size];
    let scale = 1.0 / frame_size as f32;

    for (t, frame) in spec.frames.iter().enumerate() {
        if frame.len() != n_bins {
            return Err(AnalysisError::InvalidInput(format!(
                "Frame {} has {} bins, expected {}",
                t,
                frame.len(),
                n_bins
            )));
        }

        // Rebuild the full Hermitian spectrum
        buffer[..n_bins].copy_from_slice(frame);
        for k in n_bins..frame_size {
            buffer[k] = frame[frame_size - k].conj();
        }
        ifft.process_with_scratch(&mut buffer, &mut scratch);

        let start = t * hop_size;
        for i in 0..frame_size {
            output[start + i] += buffer[i].re * scale * window[i];
            window_sum[start + i] += window[i] * window[i];
        }
    }

    for (y, &w) in output.iter_mut().zip(window_sum.iter()) {
        if w > EPSILON {
            *y /= w;
        }
    }

    let mut samples: Vec<f32> = output.into_iter().skip(pad).take(length).collect();
    samples.resize(length, 0.0);
    Ok(samples)
}
