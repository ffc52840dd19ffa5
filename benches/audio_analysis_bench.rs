//! Performance benchmarks for tempo and key analysis

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keytempo::features::chroma::extract_chroma;
use keytempo::features::hpss::harmonic;
use keytempo::features::period::estimate_tempo;
use keytempo::{analyze_audio, AnalysisConfig, AudioSignal};

fn synthetic_signal(seconds: usize) -> AudioSignal {
    // A4 tone with a click every half second (120 BPM)
    let sample_rate = 22050usize;
    let samples: Vec<f32> = (0..sample_rate * seconds)
        .map(|i| {
            let tone = (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / sample_rate as f32).sin() * 0.5;
            let click = if i % (sample_rate / 2) == 0 { 0.5 } else { 0.0 };
            tone + click
        })
        .collect();
    AudioSignal::new(samples, sample_rate as u32).expect("valid signal")
}

fn bench_analyze_audio(c: &mut Criterion) {
    let signal = synthetic_signal(30);
    let config = AnalysisConfig::default();

    c.bench_function("analyze_audio_30s", |b| {
        b.iter(|| {
            let _ = analyze_audio(black_box(&signal), black_box(config.clone()));
        });
    });
}

fn bench_stages(c: &mut Criterion) {
    let signal = synthetic_signal(10);
    let config = AnalysisConfig::default();

    c.bench_function("tempo_10s", |b| {
        b.iter(|| estimate_tempo(black_box(&signal), &config));
    });
    c.bench_function("hpss_10s", |b| {
        b.iter(|| harmonic(black_box(&signal), &config));
    });
    c.bench_function("cqt_chroma_10s", |b| {
        b.iter(|| extract_chroma(black_box(&signal), &config));
    });
}

criterion_group!(benches, bench_analyze_audio, bench_stages);
criterion_main!(benches);
