//! Example: Analyze a single audio file
//!
//! Usage:
//!   cargo run --release --example analyze_file -- <file>

use keytempo::{analyze_audio_full, AnalysisOutcome};

fn main() {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: analyze_file <file>");
        std::process::exit(2);
    };

    match analyze_audio_full(&path) {
        AnalysisOutcome::Analyzed(result) => {
            println!("Analysis Results:");
            println!("  BPM: {}", result.bpm);
            println!("  Key: {} (score: {:.4})", result.key_label(), result.key_score);
            println!("  Duration: {:.2} s at {} Hz", result.metadata.duration_seconds, result.metadata.sample_rate);
            println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);
        }
        AnalysisOutcome::Failed { reason } => {
            eprintln!("Analysis failed: {}", reason);
            std::process::exit(1);
        }
    }
}
