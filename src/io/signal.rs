//! Mono sample buffer with its sample rate

use crate::error::AnalysisError;

/// Mono audio waveform plus sample rate
///
/// Immutable once constructed; every analysis stage that transforms the
/// waveform returns a new signal.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSignal {
    /// Create a signal from mono samples
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if `sample_rate` is zero or any
    /// sample is non-finite.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("Invalid sample rate: 0".to_string()));
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::InvalidInput(format!(
                "Non-finite sample at index {}",
                pos
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Samples, normalized to roughly [-1.0, 1.0]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the signal holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self {
            samples,
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_rate() {
        assert!(AudioSignal::new(vec![0.0; 10], 0).is_err());
    }

    #[test]
    fn test_rejects_nan() {
        assert!(AudioSignal::new(vec![0.0, f32::NAN], 44100).is_err());
    }

    #[test]
    fn test_duration() {
        let signal = AudioSignal::new(vec![0.0; 22050], 22050).unwrap();
        assert_eq!(signal.len(), 22050);
        assert!((signal.duration_seconds() - 1.0).abs() < 1e-6);
    }
}
