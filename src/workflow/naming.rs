//! Output filename construction

use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::analysis::result::AnalysisResult;

/// Characters that are not allowed in filenames on common filesystems
const FORBIDDEN: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Replace every forbidden filename character with `_`
///
/// Titles that are empty or all whitespace become `"output"`.
///
/// # Example
///
/// ```
/// use keytempo::workflow::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC: Live?"), "AC_DC_ Live_");
/// ```
pub fn sanitize_filename(title: &str) -> String {
    if title.trim().is_empty() {
        return "output".to_string();
    }
    title
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}

/// Build the output filename for a track
///
/// `"<title>.<ext>"` without analysis, `"<title> - <bpm>BPM <key>.<ext>"`
/// with it. The title is sanitized.
pub fn output_filename(title: &str, analysis: Option<&AnalysisResult>, format: OutputFormat) -> String {
    let title = sanitize_filename(title);
    match analysis {
        Some(result) => format!(
            "{} - {}BPM {}.{}",
            title,
            result.bpm,
            result.key_label(),
            format.extension()
        ),
        None => format!("{}.{}", title, format.extension()),
    }
}

/// First path in `dir` that does not exist yet
///
/// Tries `filename`, then `"<stem> (1).<ext>"`, `"<stem> (2).<ext>"`, ...
pub fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(filename);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = as_path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut counter = 1u32;
    loop {
        let name = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, counter, ext),
            None => format!("{} ({})", stem, counter),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            log::debug!("{} exists, using {}", filename, candidate.display());
            return candidate;
        }
        counter += 1;
    }
}
