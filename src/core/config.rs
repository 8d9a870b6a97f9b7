//! Upscaler configuration.
//!
//! All defaults live in [`UpscaleConfig::default`]; the value is passed
//! explicitly to the pipeline, the batch engine and the folder watcher.
//! Configuration files are TOML; every field is optional.

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default integer scale factor (16x assets become 64x assets).
pub const DEFAULT_SCALE_FACTOR: u32 = 4;

/// Default JPEG quality for re-encoded output.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// PNG compression effort.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    #[default]
    Best,
}

/// Settings that control encoding of finished rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_compression: PngCompression::Best,
        }
    }
}

/// Complete configuration for a pixup run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpscaleConfig {
    /// Linear scale factor applied by the resampler.
    pub scale_factor: u32,
    /// JPEG output quality, 1..=100.
    pub jpeg_quality: u8,
    /// PNG output compression.
    pub png_compression: PngCompression,
    /// Folder scanned for new images.
    pub input_dir: PathBuf,
    /// Folder receiving upscaled images.
    pub output_dir: PathBuf,
    /// Seconds to sleep between folder scans.
    pub scan_interval_secs: u64,
    /// File extensions picked up by the scanner (without the dot).
    pub extensions: Vec<String>,
    /// Glob applied to file names (e.g. `sprite_*`).
    pub pattern: String,
    /// Search subfolders recursively.
    pub recursive: bool,
    /// Process independent images in parallel.
    pub parallel: bool,
    /// Maximum worker threads (0 = use all available).
    pub max_threads: usize,
}

impl Default for UpscaleConfig {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_compression: PngCompression::Best,
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            scan_interval_secs: 5,
            extensions: ["png", "jpg", "jpeg", "gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pattern: "*".to_string(),
            recursive: false,
            parallel: true,
            max_threads: 0,
        }
    }
}

impl UpscaleConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale_factor == 0 {
            return Err(ConfigError::invalid("scale_factor", "must be a positive integer"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::invalid("jpeg_quality", "must be between 1 and 100"));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::invalid("extensions", "at least one extension is required"));
        }
        if let Err(e) = glob::Pattern::new(&self.pattern) {
            return Err(ConfigError::invalid("pattern", e.to_string()));
        }
        Ok(())
    }

    /// Set the scale factor.
    pub fn with_scale_factor(mut self, factor: u32) -> Self {
        self.scale_factor = factor;
        self
    }

    /// Set the JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set the input folder.
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Set the output folder.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the scan interval in seconds.
    pub fn with_scan_interval(mut self, secs: u64) -> Self {
        self.scan_interval_secs = secs;
        self
    }

    /// Set the file name pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Enable/disable parallel processing across images.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            jpeg_quality: self.jpeg_quality,
            png_compression: self.png_compression,
        }
    }

    /// Whether `extension` (without the dot) is one the scanner accepts.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UpscaleConfig::default();
        assert_eq!(config.scale_factor, 4);
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.png_compression, PngCompression::Best);
        assert_eq!(config.scan_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = UpscaleConfig::from_toml_str(
            r#"
            scale_factor = 2
            png_compression = "fast"
            input_dir = "sprites"
            "#,
        )
        .unwrap();
        assert_eq!(config.scale_factor, 2);
        assert_eq!(config.png_compression, PngCompression::Fast);
        assert_eq!(config.input_dir, PathBuf::from("sprites"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.extensions.len(), 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = UpscaleConfig::from_toml_str("scale_factor = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "scale_factor"));

        let err = UpscaleConfig::from_toml_str("jpeg_quality = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "jpeg_quality"));

        let err = UpscaleConfig::from_toml_str("pattern = \"[\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "pattern"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = UpscaleConfig::new()
            .with_scale_factor(3)
            .with_output_dir("big")
            .with_parallel(false);
        let text = config.to_toml().unwrap();
        assert_eq!(UpscaleConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_accepts_extension_case_insensitive() {
        let config = UpscaleConfig::default();
        assert!(config.accepts_extension("PNG"));
        assert!(config.accepts_extension("jpeg"));
        assert!(!config.accepts_extension("bmp"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = UpscaleConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
