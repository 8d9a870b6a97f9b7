//! Execution module.
//!
//! The single-image pipeline, the batch engine built on it and the folder
//! watcher that feeds the batch engine.

pub mod engine;
pub mod pipeline;
pub mod progress;
pub mod watch;

pub use engine::{BatchEngine, BatchOptions, BatchReport, FileReport, FileStatus, Job};
pub use pipeline::{process_raster, ImageOutcome, Upscaler};
pub use progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
pub use watch::Watcher;
