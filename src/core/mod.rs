//! Core types for the Pixup upscaling pipeline.
//!
//! This module contains the foundational types shared by every stage:
//! - The raster buffer and format tags
//! - Configuration
//! - Error types

pub mod types;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use types::{ImageKind, Palette, PixelFormat, Raster, SourceFormat, ALPHA_OPAQUE, ALPHA_TRANSPARENT};
pub use config::{EncodeOptions, PngCompression, UpscaleConfig};
pub use error::{ConfigError, PixupError, UpscaleError};
