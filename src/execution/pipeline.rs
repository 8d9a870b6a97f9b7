//! The upscaling pipeline.
//!
//! [`Upscaler::process_raster`] is the core entry point:
//! resample -> classify -> enhance -> blend. The file and byte variants wrap
//! it with decoding and encoding.

use crate::core::config::UpscaleConfig;
use crate::core::error::{ConfigError, UpscaleError, UpscaleResult};
use crate::core::types::{ImageKind, Raster, SourceFormat};
use crate::filters::{has_transparency, select_pass, upscale};
use crate::io::codec;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Summary of one processed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOutcome {
    pub kind: ImageKind,
    pub source_width: u32,
    pub source_height: u32,
    pub width: u32,
    pub height: u32,
    /// Which quality pass ran ("opaque" or "alpha").
    pub pass: String,
    pub duration_ms: u64,
}

/// Runs the upscale pipeline with a fixed configuration.
///
/// Holds no per-image state, so one instance can be shared across threads
/// processing different images.
#[derive(Debug, Clone, Default)]
pub struct Upscaler {
    config: UpscaleConfig,
}

impl Upscaler {
    /// Create an upscaler, validating the configuration.
    pub fn new(config: UpscaleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &UpscaleConfig {
        &self.config
    }

    /// Upscale and clean up a decoded raster.
    ///
    /// Either the complete result is returned or an error; the input is
    /// consumed in both cases.
    pub fn process_raster(&self, raster: Raster, format: &SourceFormat) -> UpscaleResult<Raster> {
        self.run(raster, format).map(|(raster, _)| raster)
    }

    fn run(&self, raster: Raster, format: &SourceFormat) -> UpscaleResult<(Raster, &'static str)> {
        let mut upscaled = upscale(&raster, self.config.scale_factor)?;
        drop(raster);

        let pass = select_pass(has_transparency(format));
        log::debug!(
            "Running {} pass on {}x{} ({} source)",
            pass.name(),
            upscaled.width(),
            upscaled.height(),
            format
        );
        pass.enhance(&mut upscaled)?;
        pass.blend(&mut upscaled)?;
        Ok((upscaled, pass.name()))
    }

    /// Decode, process and re-encode an image in its own format.
    pub fn process_bytes(&self, bytes: &[u8]) -> UpscaleResult<(Vec<u8>, ImageOutcome)> {
        let start = Instant::now();
        let decoded = codec::decode(bytes)?;
        let kind = decoded.kind;
        let (source_width, source_height) = decoded.raster.dimensions();

        let (finished, pass) = self.run(decoded.raster, &decoded.format)?;
        let encoded = codec::encode(&finished, kind, &self.config.encode_options())?;

        let outcome = ImageOutcome {
            kind,
            source_width,
            source_height,
            width: finished.width(),
            height: finished.height(),
            pass: pass.to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        Ok((encoded, outcome))
    }

    /// Process `input` and write the result to `output`.
    ///
    /// The output's parent directory is created if needed. Nothing is
    /// written when processing fails.
    pub fn process_file(&self, input: &Path, output: &Path) -> UpscaleResult<ImageOutcome> {
        // Reject unsupported extensions before reading the file.
        let declared = ImageKind::from_path(input)?;
        let bytes = std::fs::read(input)?;
        let (encoded, outcome) = self.process_bytes(&bytes)?;
        if outcome.kind != declared {
            log::debug!(
                "{} has a .{} extension but contains {} data",
                input.display(),
                declared,
                outcome.kind
            );
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output, encoded)?;
        log::info!(
            "Upscaled {} -> {} ({}x{} -> {}x{}, {} pass, {}ms)",
            input.display(),
            output.display(),
            outcome.source_width,
            outcome.source_height,
            outcome.width,
            outcome.height,
            outcome.pass,
            outcome.duration_ms
        );
        Ok(outcome)
    }
}

/// Convenience wrapper: process one raster with a given scale factor and
/// otherwise default settings.
pub fn process_raster(raster: Raster, format: &SourceFormat, scale_factor: u32) -> UpscaleResult<Raster> {
    let upscaler = Upscaler::new(UpscaleConfig::new().with_scale_factor(scale_factor))
        .map_err(|_| UpscaleError::InvalidScaleFactor(scale_factor))?;
    upscaler.process_raster(raster, format)
}
