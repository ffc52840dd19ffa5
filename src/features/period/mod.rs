//! Period estimation modules
//!
//! Convert the onset strength envelope to a global tempo:
//! - FFT autocorrelation
//! - Autocorrelation tempogram
//! - Log-normal tempo prior and lag selection

pub mod autocorrelation;
pub mod tempogram;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::onset::onset_strength;
use crate::io::AudioSignal;

/// Global tempo estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    /// Tempo at the selected autocorrelation lag
    pub bpm: f32,

    /// `bpm` rounded half-to-even, at least 1
    pub bpm_rounded: u32,

    /// Selected lag in onset frames
    pub lag: usize,
}

/// Estimate the global tempo of a signal
///
/// Onset strength -> autocorrelation tempogram averaged over time -> lag with
/// the highest `ln(1 + 1e6 * acf) + log prior`, where the prior is log-normal
/// around `start_bpm` with `std_bpm` octaves of spread.
///
/// Signals without rhythmic content have an all-zero tempogram, so the prior
/// alone picks the lag nearest to `start_bpm`.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the STFT parameters are invalid
/// and `AnalysisError::NumericalError` if no lag falls below `max_bpm`.
pub fn estimate_tempo(signal: &AudioSignal, config: &AnalysisConfig) -> Result<TempoEstimate, AnalysisError> {
    let envelope = onset_strength(signal, config)?;

    let frame_rate = signal.sample_rate() as f32 / config.hop_size as f32;
    let win_length = (config.tempo_window_seconds * frame_rate).floor() as usize;
    let acf = tempogram::global_tempogram(&envelope, win_length)?;

    let (lag, bpm) = select_tempo_lag(&acf, frame_rate, config).ok_or_else(|| {
        AnalysisError::NumericalError(format!(
            "No tempo lag below {:.1} BPM within a {}-frame window",
            config.max_bpm, win_length
        ))
    })?;

    let estimate = TempoEstimate {
        bpm,
        bpm_rounded: round_bpm(bpm),
        lag,
    };
    log::debug!(
        "Tempo: lag={} frames -> {:.2} BPM (rounded {})",
        estimate.lag,
        estimate.bpm,
        estimate.bpm_rounded
    );
    Ok(estimate)
}

/// Select the tempo lag from a global tempogram
///
/// Lag 0 and lags whose tempo is at or above `max_bpm` are excluded. Ties go
/// to the smallest lag.
///
/// # Arguments
///
/// * `acf` - Tempogram indexed by lag in onset frames
/// * `frame_rate` - Onset frames per second (`sample_rate / hop_size`)
/// * `config` - Prior parameters (`start_bpm`, `std_bpm`, `max_bpm`)
///
/// # Returns
///
/// `(lag, bpm)` of the best candidate, or `None` if no lag qualifies
pub fn select_tempo_lag(acf: &[f32], frame_rate: f32, config: &AnalysisConfig) -> Option<(usize, f32)> {
    let log2_start = config.start_bpm.log2();

    let mut best: Option<(usize, f32, f32)> = None;
    for (lag, &a) in acf.iter().enumerate().skip(1) {
        let bpm = 60.0 * frame_rate / lag as f32;
        if bpm >= config.max_bpm {
            continue;
        }
        let z = (bpm.log2() - log2_start) / config.std_bpm;
        let score = (1e6 * a.max(0.0)).ln_1p() - 0.5 * z * z;
        if best.map_or(true, |(_, _, s)| score > s) {
            best = Some((lag, bpm, score));
        }
    }
    best.map(|(lag, bpm, _)| (lag, bpm))
}

/// Round a tempo to an integer BPM, ties to even, never below 1
pub fn round_bpm(bpm: f32) -> u32 {
    bpm.round_ties_even().max(1.0) as u32
}
