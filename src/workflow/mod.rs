//! Export workflow
//!
//! Everything around the estimator that turns an analyzed file into a tagged
//! track on disk:
//! - Output configuration (directory, format, analysis toggle)
//! - Filename sanitization, tagging and collision handling
//! - Finalization (analyze, name, copy)
//! - Background analysis workers

pub mod export;
pub mod naming;
pub mod worker;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

pub use export::{finalize_track, FinalizedTrack};
pub use naming::{output_filename, sanitize_filename, unique_path};
pub use worker::{spawn_analysis, spawn_finalize, AnalysisHandle, WorkerHandle};

/// Container format of exported tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// RIFF/WAVE
    #[default]
    Wav,
    /// MPEG-1 Layer III
    Mp3,
}

impl OutputFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
        }
    }
}

/// Export workflow configuration
///
/// Passed explicitly to every workflow operation; there is no global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Directory that receives finished tracks
    pub download_directory: PathBuf,

    /// Format of finished tracks
    pub output_format: OutputFormat,

    /// Append tempo and key to filenames
    pub analyze_enabled: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            download_directory: default_download_directory(),
            output_format: OutputFormat::default(),
            analyze_enabled: true,
        }
    }
}

impl WorkflowConfig {
    /// Load a configuration from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the JSON is malformed or a
    /// field has the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self, AnalysisError> {
        serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidInput(format!("Invalid workflow config: {}", e)))
    }

    /// Serialize the configuration as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::ProcessingError` if serialization fails.
    pub fn to_json_string(&self) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::ProcessingError(format!("Cannot serialize workflow config: {}", e)))
    }
}

/// `~/Downloads` if it exists, else the home directory, else `.`
fn default_download_directory() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => {
            let downloads = home.join("Downloads");
            if downloads.is_dir() {
                downloads
            } else {
                home
            }
        }
        None => PathBuf::from("."),
    }
}
