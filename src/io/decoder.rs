//! Audio decoding using Symphonia

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::signal::AudioSignal;
use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::downmix_to_mono;

/// Decode an audio file to a mono signal at its native sample rate
///
/// Multi-channel audio is averaged to mono. No resampling is performed.
///
/// # Arguments
///
/// * `path` - Path to audio file (WAV, MP3, FLAC, Ogg Vorbis, AAC/M4A)
///
/// # Errors
///
/// Returns `AnalysisError::IoError` if the file cannot be opened and
/// `AnalysisError::DecodingError` if the container or codec is unsupported,
/// corrupt, or yields no samples.
pub fn decode_audio<P: AsRef<Path>>(path: P) -> Result<AudioSignal, AnalysisError> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path)
        .map_err(|e| AnalysisError::IoError(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AnalysisError::DecodingError(format!("Failed to probe format: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::DecodingError("No supported audio tracks found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::DecodingError("Track has no sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AnalysisError::DecodingError(format!("Failed to create decoder: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AnalysisError::DecodingError(format!(
                    "Failed to read packet: {}",
                    e
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count();
                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                mono.extend(downmix_to_mono(sample_buf.samples(), channels)?);
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                // Corrupted packets are skipped, the rest of the stream is still usable
                skipped_packets += 1;
                log::debug!("Skipping undecodable packet: {}", msg);
            }
            Err(e) => {
                return Err(AnalysisError::DecodingError(format!(
                    "Decoder failure: {}",
                    e
                )))
            }
        }
    }

    if skipped_packets > 0 {
        log::warn!(
            "{}: skipped {} undecodable packets",
            path.display(),
            skipped_packets
        );
    }

    if mono.is_empty() {
        return Err(AnalysisError::DecodingError(format!(
            "{}: no audio samples decoded",
            path.display()
        )));
    }

    log::debug!(
        "Decoded {} mono samples at {} Hz ({:.2}s)",
        mono.len(),
        sample_rate,
        mono.len() as f32 / sample_rate as f32
    );

    AudioSignal::new(mono, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let result = decode_audio("/definitely/not/here.wav");
        assert!(matches!(result, Err(AnalysisError::IoError(_))));
    }

    #[test]
    fn test_garbage_is_decoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"this is not a riff header at all").unwrap();
        let result = decode_audio(&path);
        assert!(matches!(result, Err(AnalysisError::DecodingError(_))));
    }

    #[test]
    fn test_decodes_stereo_wav_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..1000 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let signal = decode_audio(&path).unwrap();
        assert_eq!(signal.sample_rate(), 22050);
        assert_eq!(signal.len(), 1000);
        for &s in signal.samples() {
            assert!((s - 0.25).abs() < 1e-3, "expected ~0.25, got {}", s);
        }
    }
}
