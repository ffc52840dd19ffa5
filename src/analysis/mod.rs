//! Analysis result types
//!
//! - Result and outcome types
//! - Metadata

pub mod metadata;
pub mod result;

pub use metadata::AnalysisMetadata;
pub use result::{AnalysisOutcome, AnalysisResult, Key};
