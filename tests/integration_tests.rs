//! Integration tests for tempo and key analysis

use std::path::{Path, PathBuf};

use keytempo::workflow::{finalize_track, OutputFormat, WorkflowConfig};
use keytempo::{
    analyze_audio, analyze_audio_full, decode_audio, AnalysisConfig, AnalysisOutcome, AudioSignal, Key,
};
use rayon::prelude::*;

const SAMPLE_RATE: u32 = 22050;

/// C4 D4 E4 F4 G4 A4 B4 C5
const C_MAJOR_SCALE: [f32; 8] = [261.63, 293.66, 329.63, 349.23, 392.00, 440.00, 493.88, 523.25];

/// A4 B4 C5 D5 E5 F5 G5 A5
const A_MINOR_SCALE: [f32; 8] = [440.00, 493.88, 523.25, 587.33, 659.26, 698.46, 783.99, 880.00];

/// Sine tones played one after another, `note_seconds` each
fn melody(freqs: &[f32], note_seconds: f32, amplitude: f32) -> Vec<f32> {
    let note_len = (SAMPLE_RATE as f32 * note_seconds) as usize;
    freqs
        .iter()
        .flat_map(|&f| {
            (0..note_len).map(move |i| {
                amplitude * (2.0 * std::f32::consts::PI * f * i as f32 / SAMPLE_RATE as f32).sin()
            })
        })
        .collect()
}

/// Write 16-bit PCM WAV, duplicating mono samples into every channel
fn write_wav(path: &Path, samples: &[f32], channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(v).expect("write sample");
        }
    }
    writer.finalize().expect("finalize wav");
}

fn fixture(dir: &Path, name: &str, samples: &[f32]) -> PathBuf {
    let path = dir.join(name);
    write_wav(&path, samples, 1);
    path
}

/// `^[A-G](#)? (Maj|Min)$`
fn is_valid_key_label(label: &str) -> bool {
    let Some((tonic, mode)) = label.split_once(' ') else {
        return false;
    };
    let mut chars = tonic.chars();
    let letter_ok = matches!(chars.next(), Some('A'..='G'));
    let rest = chars.as_str();
    letter_ok && (rest.is_empty() || rest == "#") && (mode == "Maj" || mode == "Min")
}

#[test]
fn test_c_major_scale_is_c_major() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "c_major.wav", &melody(&C_MAJOR_SCALE, 0.5, 0.5));

    let outcome = analyze_audio_full(&path);
    assert!(outcome.is_analyzed(), "analysis failed: {:?}", outcome);
    assert_eq!(outcome.key_label().as_deref(), Some("C Maj"));
    assert!(outcome.bpm().unwrap() >= 1);

    let result = outcome.result().unwrap();
    assert_eq!(result.metadata.sample_rate, SAMPLE_RATE);
    assert!((result.metadata.duration_seconds - 4.0).abs() < 0.01);
}

#[test]
fn test_a_minor_scale_is_a_minor() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "a_minor.wav", &melody(&A_MINOR_SCALE, 0.5, 0.5));

    let outcome = analyze_audio_full(&path);
    assert_eq!(outcome.key_label().as_deref(), Some("A Min"));
}

/// Semitone offsets of a major scale, tonic to octave
const MAJOR_SCALE_STEPS: [i32; 8] = [0, 2, 4, 5, 7, 9, 11, 12];

#[test]
fn test_major_scale_signal_in_every_key() {
    let mismatches: Vec<(u32, Key)> = (0..12u32)
        .into_par_iter()
        .filter_map(|root| {
            let freqs: Vec<f32> = MAJOR_SCALE_STEPS
                .iter()
                .map(|&step| 261.63 * 2f32.powf((root as i32 + step) as f32 / 12.0))
                .collect();
            let signal = AudioSignal::new(melody(&freqs, 0.5, 0.5), SAMPLE_RATE).unwrap();
            let result = analyze_audio(&signal, AnalysisConfig::default()).unwrap();
            (result.key != Key::Major(root)).then_some((root, result.key))
        })
        .collect();
    assert!(mismatches.is_empty(), "mismatches: {:?}", mismatches);
}

#[test]
fn test_nonexistent_file_yields_neither_value() {
    let outcome = analyze_audio_full("/definitely/not/a/file.wav");
    assert!(matches!(outcome, AnalysisOutcome::Failed { .. }));
    assert_eq!(outcome.bpm(), None);
    assert_eq!(outcome.key_label(), None);
}

#[test]
fn test_undecodable_file_yields_neither_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.wav");
    std::fs::write(&path, vec![0x42u8; 4096]).unwrap();

    let outcome = analyze_audio_full(&path);
    assert_eq!(outcome.bpm(), None);
    assert_eq!(outcome.key_label(), None);
}

#[test]
fn test_analysis_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "scale.wav", &melody(&C_MAJOR_SCALE, 0.25, 0.4));

    let first = analyze_audio_full(&path);
    let second = analyze_audio_full(&path);
    assert_eq!(first.bpm(), second.bpm());
    assert_eq!(first.key_label(), second.key_label());
}

#[test]
fn test_silence_is_analyzed_deterministically() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "silence.wav", &vec![0.0f32; SAMPLE_RATE as usize * 3]);

    let outcome = analyze_audio_full(&path);
    let label = outcome.key_label().expect("silence still yields a key");
    assert!(is_valid_key_label(&label), "bad label {:?}", label);
    // Uniform chroma is equidistant from every key, which resolves to C major
    assert_eq!(label, "C Maj");
    // No onsets: the tempo prior alone picks the lag nearest 120 BPM
    assert_eq!(outcome.bpm(), Some(117));

    let again = analyze_audio_full(&path);
    assert_eq!(again.bpm(), outcome.bpm());
    assert_eq!(again.key_label(), outcome.key_label());
}

#[test]
fn test_labels_parse_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "a_minor.wav", &melody(&A_MINOR_SCALE, 0.25, 0.5));

    let label = analyze_audio_full(&path).key_label().unwrap();
    assert!(is_valid_key_label(&label));
    let key: Key = label.parse().unwrap();
    assert_eq!(key.label(), label);
}

#[test]
fn test_stereo_matches_mono() {
    let dir = tempfile::tempdir().unwrap();
    let samples = melody(&C_MAJOR_SCALE, 0.25, 0.5);
    let mono = fixture(dir.path(), "mono.wav", &samples);
    let stereo = dir.path().join("stereo.wav");
    write_wav(&stereo, &samples, 2);

    let a = analyze_audio_full(&mono);
    let b = analyze_audio_full(&stereo);
    assert_eq!(a.bpm(), b.bpm());
    assert_eq!(a.key_label(), b.key_label());
}

#[test]
fn test_decoded_signal_matches_in_memory_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "c_major.wav", &melody(&C_MAJOR_SCALE, 0.5, 0.5));

    let signal = decode_audio(&path).unwrap();
    assert_eq!(signal.sample_rate(), SAMPLE_RATE);
    let direct = analyze_audio(&signal, AnalysisConfig::default()).unwrap();
    let via_file = analyze_audio_full(&path).into_result().unwrap();
    assert_eq!(direct.bpm, via_file.bpm);
    assert_eq!(direct.key, via_file.key);
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<PathBuf> = [&C_MAJOR_SCALE, &A_MINOR_SCALE, &C_MAJOR_SCALE, &A_MINOR_SCALE]
        .iter()
        .enumerate()
        .map(|(i, scale)| fixture(dir.path(), &format!("track_{}.wav", i), &melody(*scale, 0.25, 0.5)))
        .collect();

    let sequential: Vec<_> = paths
        .iter()
        .map(|p| analyze_audio_full(p).key_label())
        .collect();
    let parallel: Vec<_> = paths
        .par_iter()
        .map(|p| analyze_audio_full(p).key_label())
        .collect();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_finalize_tags_filename() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let converted = fixture(src.path(), "audio.wav", &melody(&C_MAJOR_SCALE, 0.5, 0.5));

    let config = WorkflowConfig {
        download_directory: out.path().to_path_buf(),
        output_format: OutputFormat::Wav,
        analyze_enabled: true,
    };
    let track = finalize_track(&config, "Scale: Test", &converted).unwrap();
    let analysis = track.analysis.as_ref().expect("analysis succeeded");
    assert!(!track.analysis_failed);
    assert_eq!(analysis.key_label(), "C Maj");

    let expected = format!("Scale_ Test - {}BPM C Maj.wav", analysis.bpm);
    assert_eq!(track.path, out.path().join(&expected));
    assert_eq!(
        std::fs::read(&track.path).unwrap(),
        std::fs::read(&converted).unwrap()
    );

    // Same title again lands next to it with a counter
    let again = finalize_track(&config, "Scale: Test", &converted).unwrap();
    let expected_again = format!("Scale_ Test - {}BPM C Maj (1).wav", analysis.bpm);
    assert_eq!(again.path, out.path().join(expected_again));
}
