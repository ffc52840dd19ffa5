//! Configuration parameters for audio analysis

use crate::error::AnalysisError;

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // STFT parameters
    /// Frame size for STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size for STFT, CQT and onset frames (default: 512)
    pub hop_size: usize,

    // Harmonic/percussive separation
    /// Median filter length in frames/bins for HPSS (default: 31)
    pub hpss_kernel_size: usize,

    /// Soft mask exponent (default: 2.0)
    pub hpss_power: f32,

    /// Separation margin applied to the percussive estimate (default: 1.0)
    /// Values above 1.0 keep less energy in the harmonic component
    pub hpss_margin: f32,

    // Constant-Q chroma
    /// Center frequency of the lowest CQT bin (default: C1, 32.703 Hz)
    pub cqt_fmin: f32,

    /// Number of octaves covered by the CQT (default: 7)
    pub cqt_n_octaves: usize,

    /// CQT bins per octave, must be a multiple of 12 (default: 36)
    pub cqt_bins_per_octave: usize,

    /// Filter scale factor, larger values give longer kernels (default: 1.0)
    pub cqt_filter_scale: f32,

    // Tempo estimation
    /// Tempo prior center in BPM (default: 120.0)
    pub start_bpm: f32,

    /// Tempo prior standard deviation in octaves (default: 1.0)
    pub std_bpm: f32,

    /// Maximum tempo considered (default: 320.0)
    pub max_bpm: f32,

    /// Autocorrelation window length in seconds (default: 8.0)
    pub tempo_window_seconds: f32,

    /// Dynamic range of the onset spectrogram in dB (default: 80.0)
    pub onset_top_db: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            hpss_kernel_size: 31,
            hpss_power: 2.0,
            hpss_margin: 1.0,
            cqt_fmin: 32.703_197,
            cqt_n_octaves: 7,
            cqt_bins_per_octave: 36,
            cqt_filter_scale: 1.0,
            start_bpm: 120.0,
            std_bpm: 1.0,
            max_bpm: 320.0,
            tempo_window_seconds: 8.0,
            onset_top_db: 80.0,
        }
    }
}

impl AnalysisConfig {
    /// Check parameter consistency before any processing starts
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.frame_size < 2 || self.hop_size == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid STFT parameters: frame_size={}, hop_size={}",
                self.frame_size, self.hop_size
            )));
        }
        if self.hop_size > self.frame_size {
            return Err(AnalysisError::InvalidInput(format!(
                "Hop size ({}) must not exceed frame size ({})",
                self.hop_size, self.frame_size
            )));
        }
        if self.hpss_kernel_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "HPSS kernel size must be > 0".to_string(),
            ));
        }
        if !positive(self.hpss_power) || !(self.hpss_margin.is_finite() && self.hpss_margin >= 1.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid HPSS mask parameters: power={}, margin={}",
                self.hpss_power, self.hpss_margin
            )));
        }
        if self.cqt_bins_per_octave == 0 || self.cqt_bins_per_octave % 12 != 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "CQT bins per octave must be a positive multiple of 12, got {}",
                self.cqt_bins_per_octave
            )));
        }
        if self.cqt_n_octaves == 0 || !positive(self.cqt_fmin) || !positive(self.cqt_filter_scale) {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid CQT parameters: fmin={}, octaves={}, filter_scale={}",
                self.cqt_fmin, self.cqt_n_octaves, self.cqt_filter_scale
            )));
        }
        if !positive(self.start_bpm) || !positive(self.std_bpm) || !positive(self.max_bpm) {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid tempo prior: start={}, std={}, max={}",
                self.start_bpm, self.std_bpm, self.max_bpm
            )));
        }
        if !positive(self.tempo_window_seconds) || !positive(self.onset_top_db) {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid onset parameters: window={}s, top_db={}",
                self.tempo_window_seconds, self.onset_top_db
            )));
        }
        Ok(())
    }
}

fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_bins_per_octave() {
        let config = AnalysisConfig {
            cqt_bins_per_octave: 20,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_hop() {
        let config = AnalysisConfig {
            hop_size: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
