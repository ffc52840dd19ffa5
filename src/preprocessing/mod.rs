//! Audio preprocessing modules
//!
//! Utilities for preparing decoded audio for analysis:
//! - Channel mixing (interleaved multi-channel to mono)

pub mod channel_mixer;
