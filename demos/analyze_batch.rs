//! Example: Analyze many audio files in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Files are spread over a rayon pool, one file per task. With `--json`, one
//! object per file is written to stdout (JSONL); failures carry an `error`
//! field instead of `bpm`/`key`.

use std::collections::BTreeMap;
use std::time::Instant;

use keytempo::{analyze_file, AnalysisConfig, AnalysisOutcome};
use rayon::prelude::*;
use serde::Serialize;

const USAGE: &str = "Usage: analyze_batch [--jobs N] [--json] <file1> <file2> ...

  --jobs N   Worker threads (default: available CPUs minus one)
  --json     One JSON object per file (JSONL)";

struct BatchArgs {
    jobs: usize,
    json: bool,
    paths: Vec<String>,
}

impl BatchArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, Box<dyn std::error::Error>> {
        let mut batch = BatchArgs {
            jobs: std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1).max(1))
                .unwrap_or(1),
            json: false,
            paths: Vec::new(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json" => batch.json = true,
                "--jobs" => {
                    let value = args.next().ok_or("--jobs requires a value")?;
                    batch.jobs = value.parse::<usize>()?.max(1);
                }
                "--help" | "-h" => return Ok(None),
                _ => batch.paths.push(arg),
            }
        }
        Ok(Some(batch))
    }
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_time_ms: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FileReport {
    fn new(file: String, outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Analyzed(result) => Self {
                file,
                bpm: Some(result.bpm),
                key: Some(result.key_label()),
                processing_time_ms: Some(result.metadata.processing_time_ms),
                error: None,
            },
            AnalysisOutcome::Failed { reason } => Self {
                file,
                bpm: None,
                key: None,
                processing_time_ms: None,
                error: Some(reason),
            },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let Some(args) = BatchArgs::parse(std::env::args().skip(1))? else {
        eprintln!("{}", USAGE);
        return Ok(());
    };
    if args.paths.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    eprintln!("Batch: {} files, jobs={}", args.paths.len(), args.jobs);
    let started = Instant::now();

    let config = AnalysisConfig::default();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.jobs).build()?;
    let reports: Vec<FileReport> = pool.install(|| {
        args.paths
            .par_iter()
            .map(|path| FileReport::new(path.clone(), analyze_file(path, config.clone())))
            .collect()
    });

    let mut keys: BTreeMap<&str, usize> = BTreeMap::new();
    let mut tempo_range: Option<(u32, u32)> = None;

    for report in &reports {
        if args.json {
            println!("{}", serde_json::to_string(report)?);
        }
        match (report.bpm, report.key.as_deref()) {
            (Some(bpm), Some(key)) => {
                if !args.json {
                    println!("{}\t{} BPM\t{}", report.file, bpm, key);
                }
                *keys.entry(key).or_default() += 1;
                tempo_range = Some(match tempo_range {
                    Some((lo, hi)) => (lo.min(bpm), hi.max(bpm)),
                    None => (bpm, bpm),
                });
            }
            _ if !args.json => println!(
                "{}\tERROR: {}",
                report.file,
                report.error.as_deref().unwrap_or("unknown error")
            ),
            _ => {}
        }
    }

    let analyzed: usize = keys.values().sum();
    eprintln!(
        "Done: {}/{} analyzed in {:.1}s",
        analyzed,
        reports.len(),
        started.elapsed().as_secs_f32()
    );
    if let Some((lo, hi)) = tempo_range {
        eprintln!("Tempo range: {}-{} BPM", lo, hi);
    }
    for (key, count) in &keys {
        eprintln!("  {:<7} {}", key, count);
    }

    Ok(())
}
