//! Track finalization: analyze, name and copy into the download directory

use std::fs;
use std::path::{Path, PathBuf};

use super::naming::{output_filename, unique_path};
use super::WorkflowConfig;
use crate::analysis::result::{AnalysisOutcome, AnalysisResult};
use crate::error::AnalysisError;

/// A track written to the download directory
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedTrack {
    /// Destination of the copied file
    pub path: PathBuf,

    /// Tempo and key, when analysis was enabled and succeeded
    pub analysis: Option<AnalysisResult>,

    /// Analysis was enabled but failed; the file carries the title only
    pub analysis_failed: bool,
}

/// Analyze a converted file and copy it under its final name
///
/// The converted file is left in place. When analysis is enabled but fails,
/// a warning is logged and the track is saved under its title alone.
///
/// # Arguments
///
/// * `config` - Destination directory, output format and analysis toggle
/// * `title` - Track title, sanitized before use
/// * `converted_file` - File already converted to `config.output_format`
///
/// # Errors
///
/// Returns `AnalysisError::IoError` if the converted file is missing, the
/// download directory cannot be created, or the copy fails.
pub fn finalize_track(
    config: &WorkflowConfig,
    title: &str,
    converted_file: &Path,
) -> Result<FinalizedTrack, AnalysisError> {
    if !converted_file.is_file() {
        return Err(AnalysisError::IoError(format!(
            "Converted file not found: {}",
            converted_file.display()
        )));
    }

    let (analysis, analysis_failed) = if config.analyze_enabled {
        match crate::analyze_audio_full(converted_file) {
            AnalysisOutcome::Analyzed(result) => (Some(result), false),
            AnalysisOutcome::Failed { reason } => {
                log::warn!(
                    "Tempo/key analysis failed for {:?}, saving with title only: {}",
                    title,
                    reason
                );
                (None, true)
            }
        }
    } else {
        (None, false)
    };

    let filename = output_filename(title, analysis.as_ref(), config.output_format);

    fs::create_dir_all(&config.download_directory).map_err(|e| {
        AnalysisError::IoError(format!(
            "Cannot create {}: {}",
            config.download_directory.display(),
            e
        ))
    })?;
    let path = unique_path(&config.download_directory, &filename);

    fs::copy(converted_file, &path).map_err(|e| {
        AnalysisError::IoError(format!(
            "Cannot copy {} to {}: {}",
            converted_file.display(),
            path.display(),
            e
        ))
    })?;

    log::info!("Saved {}", path.display());

    Ok(FinalizedTrack {
        path,
        analysis,
        analysis_failed,
    })
}
