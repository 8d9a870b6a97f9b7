//! # Pixup - Integer-factor Image Upscaling
//!
//! Pixup enlarges small raster images (sprites, textures, icons) by an
//! integer factor and runs a two-stage cleanup pass over the result.
//!
//! ## Pipeline
//!
//! 1. **Resample**: area-averaging resize to `factor * width` by
//!    `factor * height`. With integer factors every source pixel becomes an
//!    exact block.
//! 2. **Classify**: decide whether the source format can carry transparency.
//! 3. **Enhance**: opaque images get a sharpen kernel plus a contrast boost;
//!    transparent images get a per-pixel local contrast push that leaves
//!    alpha alone.
//! 4. **Blend**: opaque images are mixed with a Gaussian-blurred copy;
//!    transparent images are mixed with the mean of their visible
//!    neighbours, so fully transparent pixels never bleed colour.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pixup::prelude::*;
//!
//! let upscaler = Upscaler::new(UpscaleConfig::new().with_scale_factor(4))?;
//! upscaler.process_file("sprite.png".as_ref(), "sprite_4x.png".as_ref())?;
//!
//! // Or a whole folder, once:
//! let watcher = Watcher::new(UpscaleConfig::new().with_input_dir("in"))?;
//! let report = watcher.scan_once()?;
//! println!("{}", report.to_json()?);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Raster buffer, format tags, configuration and errors
//! - [`filters`]: Resampler, classifier, enhancers and blenders
//! - [`io`]: Codecs and input discovery
//! - [`execution`]: Pipeline, batch engine, progress and folder watcher

#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod filters;
pub mod io;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use pixup::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{ImageKind, Palette, PixelFormat, Raster, SourceFormat};

    // Configuration
    pub use crate::core::config::{EncodeOptions, PngCompression, UpscaleConfig};

    // Errors
    pub use crate::core::error::{
        ConfigError, PixupError, PixupResult, UpscaleError, UpscaleResult,
    };

    // Filters
    pub use crate::filters::{has_transparency, select_pass, upscale, QualityPass};

    // I/O
    pub use crate::io::{decode, encode, Decoded};

    // Execution
    pub use crate::execution::{
        process_raster, BatchEngine, BatchOptions, BatchReport, FileStatus, ImageOutcome, Job,
        ProgressUpdate, Upscaler, Watcher,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
