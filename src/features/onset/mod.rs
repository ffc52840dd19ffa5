//! Onset detection modules
//!
//! Onset strength envelopes that feed tempo estimation:
//! - Log-power spectral flux

pub mod spectral_flux;

pub use spectral_flux::{onset_strength, onset_strength_from_power};
