//! Filter module.
//!
//! Contains the pixel-level stages of the pipeline: resampling,
//! transparency classification, edge enhancement and colour blending.

pub mod kernel;
pub mod resample;
pub mod alpha;
pub mod enhance;
pub mod blend;
pub mod pass;

pub use kernel::Kernel;
pub use resample::{resample_area, upscale};
pub use alpha::has_transparency;
pub use pass::{select_pass, AlphaPass, OpaquePass, QualityPass};
