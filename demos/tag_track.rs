//! Example: Tag a converted track with tempo and key and export it
//!
//! Usage:
//!   cargo run --release --example tag_track -- [--config workflow.json] <title> <converted-file>
//!
//! The config file is optional JSON, e.g.
//! `{"download_directory": "/music/incoming", "analyze_enabled": true}`.
//! Without it, tracks go to ~/Downloads.

use std::path::PathBuf;
use std::time::Duration;

use keytempo::workflow::spawn_finalize;
use keytempo::WorkflowConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = WorkflowConfig::default();

    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            return Err("--config requires a path".into());
        }
        let json = std::fs::read_to_string(&args[1])?;
        config = WorkflowConfig::from_json_str(&json)?;
        args.drain(..2);
    }

    let [title, converted] = args.as_slice() else {
        eprintln!("Usage: tag_track [--config workflow.json] <title> <converted-file>");
        std::process::exit(2);
    };

    eprintln!("Exporting to {}", config.download_directory.display());
    let mut handle = spawn_finalize(config, title.clone(), PathBuf::from(converted))?;

    // Poll the way an interactive front end would
    while handle.try_result().is_none() && !handle.is_finished() {
        eprint!(".");
        std::thread::sleep(Duration::from_millis(200));
    }
    eprintln!();

    let track = handle.wait().ok_or("export worker exited without a result")??;
    if track.analysis_failed {
        eprintln!("Tempo/key analysis failed; saved with the title only");
    }
    println!("{}", track.path.display());
    Ok(())
}
