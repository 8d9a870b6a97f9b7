//! Error types for Pixup.
//!
//! Uses thiserror for structured errors with context. Every error raised by
//! the pipeline is local to the one image being processed; the batch and
//! watch layers record it and move on to the next file.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Pixup.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum PixupError {
    #[error("Upscale error: {0}")]
    Upscale(#[from] UpscaleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to scan {path}: {error}")]
    Scan { path: PathBuf, error: String },

    #[error("Invalid file pattern '{pattern}': {error}")]
    Pattern { pattern: String, error: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while turning one source image into an upscaled one.
#[derive(Error, Debug)]
pub enum UpscaleError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailure(String),

    #[error("Cannot allocate a {width}x{height} raster")]
    AllocationFailure { width: u64, height: u64 },

    #[error("Invalid scale factor {0}: must be a positive integer")]
    InvalidScaleFactor(u32),

    #[error("Invalid raster dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    EncodeFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Read { path: PathBuf, error: std::io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl PixupError {
    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            PixupError::Config(e) => e.suggested_fix(),
            PixupError::Upscale(UpscaleError::UnsupportedFormat(_)) => {
                Some("Supported formats are PNG, JPEG and GIF".to_string())
            }
            PixupError::Scan { path, .. } => {
                Some(format!("Create '{}' or point --input elsewhere", path.display()))
            }
            _ => None,
        }
    }
}

impl UpscaleError {
    /// Whether the failure came from the input bytes rather than from
    /// processing or the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            UpscaleError::UnsupportedFormat(_)
                | UpscaleError::DecodeFailure(_)
                | UpscaleError::InvalidDimensions { .. }
        )
    }
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            ConfigError::Read { path, .. } => {
                Some(format!("Check that the file '{}' exists", path.display()))
            }
            ConfigError::Invalid { field, .. } => {
                Some(format!("Adjust '{}' in the config file or on the command line", field))
            }
            _ => None,
        }
    }
}

/// Result type alias for Pixup operations.
pub type PixupResult<T> = Result<T, PixupError>;

/// Result type alias for pipeline operations.
pub type UpscaleResult<T> = Result<T, UpscaleError>;
