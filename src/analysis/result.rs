//! Analysis result types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::metadata::AnalysisMetadata;
use crate::error::AnalysisError;
use crate::features::chroma::PITCH_CLASS_NAMES;

/// Musical key
///
/// The pitch class must be in `0..12` for equality to agree with the label.
/// Use [`Key::major`] / [`Key::minor`] to build a key from an arbitrary
/// pitch class; deserialization normalizes the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawKey")]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

/// Wire shape of [`Key`] before the pitch class is reduced modulo 12
#[derive(Deserialize)]
enum RawKey {
    Major(u32),
    Minor(u32),
}

impl From<RawKey> for Key {
    fn from(raw: RawKey) -> Self {
        match raw {
            RawKey::Major(pc) => Key::major(pc),
            RawKey::Minor(pc) => Key::minor(pc),
        }
    }
}

impl Key {
    /// Major key on `pitch_class`, reduced modulo 12
    pub fn major(pitch_class: u32) -> Self {
        Key::Major(pitch_class % 12)
    }

    /// Minor key on `pitch_class`, reduced modulo 12
    pub fn minor(pitch_class: u32) -> Self {
        Key::Minor(pitch_class % 12)
    }

    /// Pitch class of the tonic (0-11)
    pub fn pitch_class(&self) -> u32 {
        match self {
            Key::Major(i) | Key::Minor(i) => *i % 12,
        }
    }

    /// True for major keys
    pub fn is_major(&self) -> bool {
        matches!(self, Key::Major(_))
    }

    /// Name of the tonic with sharps (e.g., "C", "F#")
    pub fn tonic_name(&self) -> &'static str {
        PITCH_CLASS_NAMES[self.pitch_class() as usize]
    }

    /// Human-readable label: tonic name, a space, then "Maj" or "Min"
    ///
    /// # Example
    ///
    /// ```
    /// use keytempo::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).label(), "C Maj");
    /// assert_eq!(Key::Major(6).label(), "F# Maj");
    /// assert_eq!(Key::Minor(9).label(), "A Min");
    /// ```
    pub fn label(&self) -> String {
        let mode = if self.is_major() { "Maj" } else { "Min" };
        format!("{} {}", self.tonic_name(), mode)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Key {
    type Err = AnalysisError;

    /// Parse a label produced by [`Key::label`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalysisError::InvalidInput(format!("Invalid key label: {:?}", s));

        let (tonic, mode) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let pitch_class = PITCH_CLASS_NAMES
            .iter()
            .position(|&name| name == tonic)
            .ok_or_else(invalid)? as u32;

        match mode {
            "Maj" => Ok(Key::Major(pitch_class)),
            "Min" => Ok(Key::Minor(pitch_class)),
            _ => Err(invalid()),
        }
    }
}

/// Complete analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Tempo in whole beats per minute
    pub bpm: u32,

    /// Detected key
    pub key: Key,

    /// Template correlation of the detected key
    pub key_score: f32,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Key label, e.g. "A Min"
    pub fn key_label(&self) -> String {
        self.key.label()
    }
}

/// Outcome of analyzing one file
///
/// Either both tempo and key are present or neither is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisOutcome {
    /// Analysis completed
    Analyzed(AnalysisResult),

    /// Analysis could not be completed (unreadable file, decoder failure, ...)
    Failed {
        /// Human-readable cause
        reason: String,
    },
}

impl AnalysisOutcome {
    /// True if tempo and key are available
    pub fn is_analyzed(&self) -> bool {
        matches!(self, AnalysisOutcome::Analyzed(_))
    }

    /// Tempo in BPM, if analyzed
    pub fn bpm(&self) -> Option<u32> {
        self.result().map(|r| r.bpm)
    }

    /// Key label, if analyzed
    pub fn key_label(&self) -> Option<String> {
        self.result().map(AnalysisResult::key_label)
    }

    /// Borrow the result, if analyzed
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::Analyzed(result) => Some(result),
            AnalysisOutcome::Failed { .. } => None,
        }
    }

    /// Take the result, if analyzed
    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            AnalysisOutcome::Analyzed(result) => Some(result),
            AnalysisOutcome::Failed { .. } => None,
        }
    }
}

impl From<Result<AnalysisResult, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<AnalysisResult, AnalysisError>) -> Self {
        match result {
            Ok(result) => AnalysisOutcome::Analyzed(result),
            Err(e) => AnalysisOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(bpm: u32, key: Key) -> AnalysisResult {
        AnalysisResult {
            bpm,
            key,
            key_score: 0.1,
            metadata: AnalysisMetadata::default(),
        }
    }

    #[test]
    fn test_key_label_major() {
        assert_eq!(Key::Major(0).label(), "C Maj");
        assert_eq!(Key::Major(1).label(), "C# Maj");
        assert_eq!(Key::Major(11).label(), "B Maj");
    }

    #[test]
    fn test_key_label_minor() {
        assert_eq!(Key::Minor(9).label(), "A Min");
        assert_eq!(Key::Minor(3).label(), "D# Min");
        assert_eq!(Key::Minor(10).to_string(), "A# Min");
    }

    #[test]
    fn test_key_label_roundtrip() {
        for i in 0..12 {
            for key in [Key::Major(i), Key::Minor(i)] {
                assert_eq!(key.label().parse::<Key>().unwrap(), key);
            }
        }
    }

    #[test]
    fn test_key_parse_rejects_garbage() {
        assert!("H Maj".parse::<Key>().is_err());
        assert!("C major".parse::<Key>().is_err());
        assert!("CMaj".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn test_pitch_class_is_reduced_modulo_12() {
        assert_eq!(Key::major(20), Key::Major(8));
        assert_eq!(Key::minor(21), Key::Minor(9));
        assert_eq!(Key::major(20).label(), Key::Major(8).label());

        let key: Key = serde_json::from_str(r#"{"Major":20}"#).unwrap();
        assert_eq!(key, Key::Major(8));
        assert_eq!(serde_json::to_string(&Key::Minor(9)).unwrap(), r#"{"Minor":9}"#);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = AnalysisOutcome::Analyzed(result(128, Key::Minor(9)));
        assert!(ok.is_analyzed());
        assert_eq!(ok.bpm(), Some(128));
        assert_eq!(ok.key_label().as_deref(), Some("A Min"));

        let failed = AnalysisOutcome::Failed {
            reason: "unreadable".to_string(),
        };
        assert!(!failed.is_analyzed());
        assert_eq!(failed.bpm(), None);
        assert_eq!(failed.key_label(), None);
        assert!(failed.into_result().is_none());
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome: AnalysisOutcome =
            Err(AnalysisError::DecodingError("bad header".to_string())).into();
        match outcome {
            AnalysisOutcome::Failed { reason } => assert!(reason.contains("bad header")),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn test_result_serializes() {
        let json = serde_json::to_string(&result(120, Key::Major(7))).unwrap();
        assert!(json.contains("\"bpm\":120"));
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key, Key::Major(7));
    }
}
