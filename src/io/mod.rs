//! Audio I/O modules
//!
//! Audio decoding using Symphonia and the in-memory signal type the
//! pipeline consumes.

pub mod decoder;
pub mod signal;

pub use decoder::decode_audio;
pub use signal::AudioSignal;
