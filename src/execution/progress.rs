//! Progress tracking for batch runs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// A batch has started.
    Started {
        total_files: usize,
    },
    /// A file has started processing.
    FileStarted {
        path: PathBuf,
        index: usize,
        total: usize,
    },
    /// A file has been processed and written.
    FileCompleted {
        path: PathBuf,
        duration_ms: u64,
        index: usize,
        total: usize,
    },
    /// A file could not be processed. The batch continues.
    FileFailed {
        path: PathBuf,
        message: String,
    },
    /// Overall progress percentage.
    Progress {
        percent: f32,
        elapsed_ms: u64,
        estimated_remaining_ms: Option<u64>,
    },
    /// The batch has finished.
    Completed {
        total_duration_ms: u64,
        files_processed: usize,
        files_failed: usize,
    },
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Tracks batch progress. Safe to share between worker threads.
pub struct ProgressTracker {
    /// Total number of files to process.
    total_files: usize,
    /// Number of files completed.
    completed_files: AtomicU64,
    /// Number of files that failed.
    failed_files: AtomicU64,
    /// Start time.
    start_time: Option<Instant>,
    /// Progress callback.
    callback: Option<ProgressCallback>,
    /// Per-file durations for estimation.
    file_times: parking_lot::Mutex<Vec<u64>>,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            completed_files: AtomicU64::new(0),
            failed_files: AtomicU64::new(0),
            start_time: None,
            callback: None,
            file_times: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Set a callback for progress updates.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Start tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.send_update(ProgressUpdate::Started {
            total_files: self.total_files,
        });
    }

    /// Report that a file has started.
    pub fn file_started(&self, path: PathBuf) {
        let done = self.finished_count();
        self.send_update(ProgressUpdate::FileStarted {
            path,
            index: done,
            total: self.total_files,
        });
    }

    /// Report that a file has completed.
    pub fn file_completed(&self, path: PathBuf, duration_ms: u64) {
        let completed = self.completed_files.fetch_add(1, Ordering::Relaxed) as usize + 1;

        self.file_times.lock().push(duration_ms);

        self.send_update(ProgressUpdate::FileCompleted {
            path,
            duration_ms,
            index: completed,
            total: self.total_files,
        });

        self.send_progress_update();
    }

    /// Report that a file failed.
    pub fn file_failed(&self, path: PathBuf, message: String) {
        self.failed_files.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::FileFailed { path, message });
        self.send_progress_update();
    }

    /// Complete tracking.
    pub fn complete(&self) {
        let duration = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.send_update(ProgressUpdate::Completed {
            total_duration_ms: duration,
            files_processed: self.completed_files.load(Ordering::Relaxed) as usize,
            files_failed: self.failed_files.load(Ordering::Relaxed) as usize,
        });
    }

    /// Get current progress percentage.
    pub fn progress_percent(&self) -> f32 {
        if self.total_files == 0 {
            return 100.0;
        }
        (self.finished_count() as f32 / self.total_files as f32) * 100.0
    }

    /// Estimate remaining time in milliseconds.
    pub fn estimated_remaining_ms(&self) -> Option<u64> {
        let times = self.file_times.lock();
        if times.is_empty() {
            return None;
        }

        let avg_time: u64 = times.iter().sum::<u64>() / times.len() as u64;
        let remaining = self.total_files.saturating_sub(self.finished_count());

        Some(avg_time * remaining as u64)
    }

    fn finished_count(&self) -> usize {
        (self.completed_files.load(Ordering::Relaxed) + self.failed_files.load(Ordering::Relaxed))
            as usize
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }

    fn send_progress_update(&self) {
        let elapsed = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.send_update(ProgressUpdate::Progress {
            percent: self.progress_percent(),
            elapsed_ms: elapsed,
            estimated_remaining_ms: self.estimated_remaining_ms(),
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_progress_calculation() {
        let tracker = ProgressTracker::new(10);
        assert_eq!(tracker.progress_percent(), 0.0);

        tracker.completed_files.store(5, Ordering::Relaxed);
        assert_eq!(tracker.progress_percent(), 50.0);

        tracker.failed_files.store(5, Ordering::Relaxed);
        assert_eq!(tracker.progress_percent(), 100.0);
    }

    #[test]
    fn test_empty_batch_is_complete() {
        assert_eq!(ProgressTracker::default().progress_percent(), 100.0);
    }

    #[test]
    fn test_estimate_uses_average_duration() {
        let tracker = ProgressTracker::new(4);
        assert_eq!(tracker.estimated_remaining_ms(), None);
        tracker.file_completed(PathBuf::from("a.png"), 100);
        tracker.file_completed(PathBuf::from("b.png"), 300);
        assert_eq!(tracker.estimated_remaining_ms(), Some(400));
    }

    #[test]
    fn test_callback_invoked() {
        let failures = Arc::new(AtomicUsize::new(0));
        let failures_clone = failures.clone();

        let mut tracker = ProgressTracker::new(2).with_callback(Box::new(move |update| {
            if let ProgressUpdate::FileFailed { .. } = update {
                failures_clone.fetch_add(1, Ordering::Relaxed);
            }
        }));

        tracker.start();
        tracker.file_started(PathBuf::from("a.png"));
        tracker.file_completed(PathBuf::from("a.png"), 10);
        tracker.file_failed(PathBuf::from("b.gif"), "bad palette".to_string());
        tracker.complete();

        assert_eq!(failures.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.progress_percent(), 100.0);
    }
}
