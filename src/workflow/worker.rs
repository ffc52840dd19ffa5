//! Background workers
//!
//! Analysis takes seconds per track, so front ends run it on a worker
//! thread and poll for the result. Each worker sends exactly one value over
//! an `mpsc` channel.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use super::export::{finalize_track, FinalizedTrack};
use super::WorkflowConfig;
use crate::analysis::result::AnalysisOutcome;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Handle to a value being produced on a worker thread
#[derive(Debug)]
pub struct WorkerHandle<T> {
    receiver: Receiver<T>,
    thread: Option<JoinHandle<()>>,
    ready: Option<T>,
}

/// Handle to a background file analysis
pub type AnalysisHandle = WorkerHandle<AnalysisOutcome>;

impl<T: Send + 'static> WorkerHandle<T> {
    fn spawn<F>(name: &str, job: F) -> Result<Self, AnalysisError>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                // The receiver may already be gone; nothing to report then
                let _ = sender.send(job());
            })
            .map_err(|e| AnalysisError::IoError(format!("Cannot spawn worker thread: {}", e)))?;

        Ok(Self {
            receiver,
            thread: Some(thread),
            ready: None,
        })
    }

    /// Poll without blocking
    ///
    /// Returns the value once the worker has finished, `None` while it is
    /// still running or if it exited without producing a value.
    pub fn try_result(&mut self) -> Option<&T> {
        if self.ready.is_none() {
            match self.receiver.try_recv() {
                Ok(value) => {
                    self.ready = Some(value);
                    self.join();
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.join(),
            }
        }
        self.ready.as_ref()
    }

    /// True once the worker's thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Block until the worker finishes
    ///
    /// Returns `None` only if the worker exited without producing a value.
    pub fn wait(mut self) -> Option<T> {
        let value = match self.ready.take() {
            Some(value) => Some(value),
            None => self.receiver.recv().ok(),
        };
        self.join();
        value
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Worker thread panicked");
            }
        }
    }
}

/// Analyze a file on a background thread
///
/// # Errors
///
/// Returns `AnalysisError::IoError` if the thread cannot be spawned.
pub fn spawn_analysis(path: PathBuf, config: AnalysisConfig) -> Result<AnalysisHandle, AnalysisError> {
    log::debug!("Spawning analysis worker for {}", path.display());
    WorkerHandle::spawn("keytempo-analysis", move || crate::analyze_file(&path, config))
}

/// Run [`finalize_track`] on a background thread
///
/// # Errors
///
/// Returns `AnalysisError::IoError` if the thread cannot be spawned. Errors
/// from the finalization itself are delivered through the handle.
pub fn spawn_finalize(
    config: WorkflowConfig,
    title: String,
    converted_file: PathBuf,
) -> Result<WorkerHandle<Result<FinalizedTrack, AnalysisError>>, AnalysisError> {
    log::debug!("Spawning export worker for {:?}", title);
    WorkerHandle::spawn("keytempo-export", move || {
        finalize_track(&config, &title, &converted_file)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_analysis_of_missing_file_reports_failure() {
        let handle = spawn_analysis(PathBuf::from("/no/such/track.wav"), AnalysisConfig::default()).unwrap();
        let outcome = handle.wait().unwrap();
        assert!(!outcome.is_analyzed());
    }

    #[test]
    fn test_try_result_eventually_ready() {
        let mut handle = WorkerHandle::spawn("test-worker", || 42u32).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(&value) = handle.try_result() {
                assert_eq!(value, 42);
                break;
            }
            assert!(Instant::now() < deadline, "worker never finished");
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(handle.is_finished());
        assert_eq!(handle.wait(), Some(42));
    }

    #[test]
    fn test_finalize_worker_delivers_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkflowConfig {
            download_directory: dir.path().to_path_buf(),
            ..WorkflowConfig::default()
        };
        let handle = spawn_finalize(config, "Song".to_string(), dir.path().join("missing.wav")).unwrap();
        let result = handle.wait().unwrap();
        assert!(matches!(result, Err(AnalysisError::IoError(_))));
    }
}
