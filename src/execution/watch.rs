//! Folder watcher.
//!
//! Polls `input_dir` on a fixed interval and upscales every image that has
//! no counterpart in `output_dir` yet.

use crate::core::config::UpscaleConfig;
use crate::core::error::{PixupError, PixupResult};
use crate::execution::engine::{BatchEngine, BatchOptions, BatchReport, Job};
use crate::io::discovery::discover;

/// Polling folder watcher.
pub struct Watcher {
    config: UpscaleConfig,
    engine: BatchEngine,
}

impl Watcher {
    /// Create a watcher. The configuration is validated here.
    pub fn new(config: UpscaleConfig) -> PixupResult<Self> {
        let engine = BatchEngine::new(config.clone())?;
        Ok(Self { config, engine })
    }

    /// Replace the batch options used for each scan.
    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.engine = self.engine.with_options(options);
        self
    }

    pub fn config(&self) -> &UpscaleConfig {
        &self.config
    }

    /// Inputs found in `input_dir` whose output does not exist yet.
    pub fn pending(&self) -> PixupResult<Vec<Job>> {
        let jobs = discover(&self.config)?
            .into_iter()
            .map(|input| Job::for_input(input, &self.config))
            .filter(|job| !job.output.exists())
            .collect();
        Ok(jobs)
    }

    /// Run one scan and process whatever is pending.
    pub fn scan_once(&self) -> PixupResult<BatchReport> {
        if !self.config.output_dir.exists() {
            std::fs::create_dir_all(&self.config.output_dir).map_err(|e| PixupError::Scan {
                path: self.config.output_dir.clone(),
                error: e.to_string(),
            })?;
        }

        let jobs = self.pending()?;
        if jobs.is_empty() {
            log::debug!("Nothing new in {}", self.config.input_dir.display());
            return Ok(BatchReport::default());
        }

        log::info!(
            "Found {} new image(s) in {}",
            jobs.len(),
            self.config.input_dir.display()
        );
        Ok(self.engine.run(&jobs))
    }

    /// Scan forever, sleeping `scan_interval_secs` between scans.
    ///
    /// Scan errors (for example a missing input folder) are logged and the
    /// loop continues.
    pub fn run(&self) -> ! {
        log::info!(
            "Watching {} -> {} every {}s",
            self.config.input_dir.display(),
            self.config.output_dir.display(),
            self.config.scan_interval_secs
        );
        loop {
            if let Err(e) = self.scan_once() {
                log::error!("Scan failed: {}", e);
            }
            std::thread::sleep(self.config.scan_interval());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EncodeOptions;
    use crate::core::types::{ImageKind, PixelFormat, Raster};
    use crate::io::codec;
    use image::Rgba;
    use std::path::Path;

    fn write_png(path: &Path) {
        let raster = Raster::filled(2, 2, PixelFormat::Rgba, Rgba([10, 200, 30, 255])).unwrap();
        std::fs::write(
            path,
            codec::encode(&raster, ImageKind::Png, &EncodeOptions::default()).unwrap(),
        )
        .unwrap();
    }

    fn config_for(dir: &Path) -> UpscaleConfig {
        UpscaleConfig::new()
            .with_input_dir(dir.join("in"))
            .with_output_dir(dir.join("out"))
            .with_scale_factor(2)
    }

    #[test]
    fn test_scan_processes_new_files_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("in")).unwrap();
        write_png(&dir.path().join("in/a.png"));

        let watcher = Watcher::new(config_for(dir.path())).unwrap();
        let first = watcher.scan_once().unwrap();
        assert_eq!(first.processed, 1);
        assert!(dir.path().join("out/a.png").exists());

        let second = watcher.scan_once().unwrap();
        assert!(second.files.is_empty());

        write_png(&dir.path().join("in/b.png"));
        let third = watcher.scan_once().unwrap();
        assert_eq!(third.processed, 1);
        assert_eq!(third.files[0].input, dir.path().join("in/b.png"));
    }

    #[test]
    fn test_scan_missing_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = Watcher::new(config_for(dir.path())).unwrap();
        assert!(matches!(watcher.scan_once(), Err(PixupError::Scan { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = UpscaleConfig::new().with_jpeg_quality(0);
        assert!(matches!(Watcher::new(config), Err(PixupError::Config(_))));
    }
}
