//! Batch engine.
//!
//! Runs the pipeline over a list of input/output pairs. A failing file is
//! recorded in the report and never stops the rest of the batch.

use crate::core::config::UpscaleConfig;
use crate::core::error::{ConfigError, PixupResult};
use crate::execution::pipeline::{ImageOutcome, Upscaler};
use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
use crate::io::discovery::output_path_for;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Batch options.
#[derive(Clone)]
pub struct BatchOptions {
    /// Whether to process images in parallel.
    pub parallel: bool,
    /// Maximum number of parallel threads (0 = use all available).
    pub max_threads: usize,
    /// Progress callback.
    pub progress_callback: Option<Arc<ProgressCallback>>,
}

impl std::fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOptions")
            .field("parallel", &self.parallel)
            .field("max_threads", &self.max_threads)
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: 0,
            progress_callback: None,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take parallelism settings from a configuration.
    pub fn from_config(config: &UpscaleConfig) -> Self {
        Self::new()
            .with_parallel(config.parallel)
            .with_max_threads(config.max_threads)
    }

    /// Enable/disable parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set maximum threads.
    pub fn with_max_threads(mut self, max: usize) -> Self {
        self.max_threads = max;
        self
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }
}

/// One unit of batch work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Job {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Build a job whose output location is derived from the configuration.
    pub fn for_input(input: impl Into<PathBuf>, config: &UpscaleConfig) -> Self {
        let input = input.into();
        let output = output_path_for(&input, config);
        Self { input, output }
    }
}

/// Per-file status in a [`BatchReport`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    Ok {
        #[serde(flatten)]
        outcome: ImageOutcome,
    },
    Failed {
        error: String,
    },
}

/// Result for one job.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, FileStatus::Ok { .. })
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Whether every job succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Jobs that failed, in submission order.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_ok())
    }

    /// Render the report as pretty-printed JSON.
    pub fn to_json(&self) -> PixupResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the pipeline over many files.
pub struct BatchEngine {
    upscaler: Upscaler,
    options: BatchOptions,
}

impl BatchEngine {
    /// Create an engine for `config`, taking parallelism from it.
    pub fn new(config: UpscaleConfig) -> Result<Self, ConfigError> {
        let options = BatchOptions::from_config(&config);
        Ok(Self {
            upscaler: Upscaler::new(config)?,
            options,
        })
    }

    /// Replace the batch options.
    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Process every job. Results keep the order of `jobs`.
    pub fn run(&self, jobs: &[Job]) -> BatchReport {
        let start = Instant::now();

        let mut tracker = ProgressTracker::new(jobs.len());
        if let Some(callback) = &self.options.progress_callback {
            let callback = callback.clone();
            tracker = tracker.with_callback(Box::new(move |update| callback(update)));
        }
        tracker.start();

        let files = if self.options.parallel && jobs.len() > 1 {
            self.run_parallel(jobs, &tracker)
        } else {
            jobs.iter().map(|job| self.run_job(job, &tracker)).collect()
        };

        tracker.complete();

        let failed = files.iter().filter(|f| !f.is_ok()).count();
        let report = BatchReport {
            processed: files.len() - failed,
            failed,
            duration_ms: duration_ms(start.elapsed()),
            files,
        };
        log::info!(
            "Batch finished: {} processed, {} failed in {}ms",
            report.processed,
            report.failed,
            report.duration_ms
        );
        report
    }

    fn run_parallel(&self, jobs: &[Job], tracker: &ProgressTracker) -> Vec<FileReport> {
        let work = || -> Vec<FileReport> {
            jobs.par_iter()
                .map(|job| self.run_job(job, tracker))
                .collect()
        };

        if self.options.max_threads == 0 {
            return work();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.max_threads)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(e) => {
                log::warn!(
                    "Could not build a {}-thread pool, using the global pool: {}",
                    self.options.max_threads,
                    e
                );
                work()
            }
        }
    }

    fn run_job(&self, job: &Job, tracker: &ProgressTracker) -> FileReport {
        tracker.file_started(job.input.clone());
        let status = match self.upscaler.process_file(&job.input, &job.output) {
            Ok(outcome) => {
                tracker.file_completed(job.input.clone(), outcome.duration_ms);
                FileStatus::Ok { outcome }
            }
            Err(e) => {
                if e.is_input_error() {
                    log::warn!("Skipping {}: {}", job.input.display(), e);
                } else {
                    log::error!("Failed to upscale {}: {}", job.input.display(), e);
                }
                tracker.file_failed(job.input.clone(), e.to_string());
                FileStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        FileReport {
            input: job.input.clone(),
            output: job.output.clone(),
            status,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
