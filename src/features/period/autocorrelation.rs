//! FFT-accelerated autocorrelation
//!
//! Computes `ACF = IFFT(|FFT(x)|^2)` with zero padding to at least twice the
//! input length, which yields the linear (non-circular) autocorrelation in
//! O(n log n).
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::AnalysisError;

/// Autocorrelation of fixed-length frames with pre-planned FFTs
pub struct Autocorrelator {
    frame_len: usize,
    fft_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Autocorrelator {
    /// Plan the transforms for frames of `frame_len` samples
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if `frame_len` is zero.
    pub fn new(frame_len: usize) -> Result<Self, AnalysisError> {
        if frame_len == 0 {
            return Err(AnalysisError::InvalidInput(
                "Autocorrelation frame length must be > 0".to_string(),
            ));
        }

        // FFT size: next power of 2 >= 2*n (for zero-padding)
        let fft_size = (2 * frame_len).next_power_of_two();
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Ok(Self {
            frame_len,
            fft_size,
            forward,
            inverse,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        })
    }

    /// Frame length the transforms were planned for
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Autocorrelate one frame into `out` (lags `0..frame_len`)
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if `frame` or `out` does not have
    /// `frame_len` elements.
    pub fn process(&mut self, frame: &[f32], out: &mut [f32]) -> Result<(), AnalysisError> {
        if frame.len() != self.frame_len || out.len() != self.frame_len {
            return Err(AnalysisError::InvalidInput(format!(
                "Autocorrelation expects {} samples, got frame={} out={}",
                self.frame_len,
                frame.len(),
                out.len()
            )));
        }

        for (slot, &x) in self.buffer.iter_mut().zip(frame.iter()) {
            *slot = Complex::new(x, 0.0);
        }
        for slot in self.buffer[self.frame_len..].iter_mut() {
            *slot = Complex::new(0.0, 0.0);
        }

        self.forward.process_with_scratch(&mut self.buffer, &mut self.scratch);
        for x in self.buffer.iter_mut() {
            *x = Complex::new(x.norm_sqr(), 0.0);
        }
        self.inverse.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / self.fft_size as f32;
        for (o, x) in out.iter_mut().zip(self.buffer.iter()) {
            // Non-negative inputs give a non-negative ACF; clamp rounding noise
            *o = (x.re * scale).max(0.0);
        }
        Ok(())
    }
}

/// Autocorrelation of a whole signal (lags `0..signal.len()`)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `signal` is empty.
pub fn compute_autocorrelation_fft(signal: &[f32]) -> Result<Vec<f32>, AnalysisError> {
    let mut acf = vec![0.0f32; signal.len()];
    Autocorrelator::new(signal.len())?.process(signal, &mut acf)?;
    Ok(acf)
}
