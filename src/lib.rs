//! # keytempo
//!
//! Estimates the global tempo (integer BPM) and musical key of an audio file,
//! and tags exported tracks with them.
//!
//! ## Features
//!
//! - **Tempo Detection**: Log-power spectral flux, autocorrelation tempogram and a log-normal tempo prior
//! - **Key Detection**: Harmonic/percussive separation, constant-Q chroma and Krumhansl-Schmuckler template matching
//! - **Workflow**: Filename tagging (`"<title> - <bpm>BPM <key>.wav"`), collision-free export and background analysis
//!
//! ## Quick Start
//!
//! ```no_run
//! use keytempo::analyze_audio_full;
//!
//! let outcome = analyze_audio_full("track.wav");
//! match (outcome.bpm(), outcome.key_label()) {
//!     (Some(bpm), Some(key)) => println!("{} BPM, {}", bpm, key),
//!     _ => println!("analysis unavailable"),
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Decode → mono signal ─┬─→ Onset strength → Tempogram → Tempo prior → BPM
//!                       └─→ HPSS (harmonic) → CQT chroma → Template matching → Key
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;
pub mod workflow;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

// Re-export main types
pub use analysis::{AnalysisMetadata, AnalysisOutcome, AnalysisResult, Key};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use io::{decode_audio, AudioSignal};
pub use workflow::{OutputFormat, WorkflowConfig};

/// Main analysis function
///
/// Estimates tempo from the signal as given and key from its harmonic
/// component.
///
/// # Arguments
///
/// * `signal` - Mono audio signal at its native sample rate
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `AnalysisResult` containing integer BPM, key and metadata
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for an empty signal or an invalid
/// configuration (including CQT bins above the signal's Nyquist frequency).
///
/// # Example
///
/// ```no_run
/// use keytempo::{analyze_audio, AnalysisConfig, AudioSignal};
///
/// let signal = AudioSignal::new(vec![0.0f32; 22050 * 10], 22050)?;
/// let result = analyze_audio(&signal, AnalysisConfig::default())?;
/// println!("{} BPM, {}", result.bpm, result.key_label());
/// # Ok::<(), keytempo::AnalysisError>(())
/// ```
pub fn analyze_audio(signal: &AudioSignal, config: AnalysisConfig) -> Result<AnalysisResult, AnalysisError> {
    let start_time = Instant::now();

    log::debug!(
        "Starting audio analysis: {} samples at {} Hz",
        signal.len(),
        signal.sample_rate()
    );

    if signal.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }
    config.validate()?;

    // Tempo on the full signal
    let tempo_start = Instant::now();
    let tempo = features::period::estimate_tempo(signal, &config)?;
    log::debug!(
        "Tempo estimated in {:.1} ms",
        tempo_start.elapsed().as_secs_f32() * 1000.0
    );

    // Key on the harmonic component
    let key_start = Instant::now();
    let harmonic = features::hpss::harmonic(signal, &config)?;
    let chroma = features::chroma::extract_chroma(&harmonic, &config)?;
    let key = features::key::detect_key(&chroma);
    log::debug!(
        "Key estimated in {:.1} ms",
        key_start.elapsed().as_secs_f32() * 1000.0
    );

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Analysis complete: {} BPM, {} in {:.1} ms",
        tempo.bpm_rounded,
        key.key.label(),
        processing_time_ms
    );

    Ok(AnalysisResult {
        bpm: tempo.bpm_rounded,
        key: key.key,
        key_score: key.score,
        metadata: AnalysisMetadata {
            duration_seconds: signal.duration_seconds(),
            sample_rate: signal.sample_rate(),
            processing_time_ms,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

/// Decode and analyze a file, converting every failure into an outcome
///
/// Decoding errors, analysis errors and internal panics are logged as
/// warnings and reported as [`AnalysisOutcome::Failed`]; this function
/// never returns an error or unwinds.
pub fn analyze_file<P: AsRef<Path>>(path: P, config: AnalysisConfig) -> AnalysisOutcome {
    let path = path.as_ref();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let signal = decode_audio(path)?;
        analyze_audio(&signal, config)
    }));

    match result {
        Ok(Ok(result)) => AnalysisOutcome::Analyzed(result),
        Ok(Err(e)) => {
            log::warn!("Analysis failed for {}: {}", path.display(), e);
            AnalysisOutcome::Failed {
                reason: e.to_string(),
            }
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            log::warn!("Analysis panicked for {}: {}", path.display(), reason);
            AnalysisOutcome::Failed { reason }
        }
    }
}

/// Analyze a file with the default configuration
///
/// Returns both tempo and key, or neither.
pub fn analyze_audio_full<P: AsRef<Path>>(path: P) -> AnalysisOutcome {
    analyze_file(path, AnalysisConfig::default())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("internal error: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("internal error: {}", s)
    } else {
        "internal error".to_string()
    }
}
