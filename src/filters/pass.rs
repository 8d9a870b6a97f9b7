//! The two-stage quality pass run after resampling.
//!
//! Opaque and alpha-aware processing share one contract, [`QualityPass`],
//! so the orchestrator picks an implementation once per image and calls
//! the same two methods either way.

use crate::core::error::UpscaleResult;
use crate::core::types::Raster;
use crate::filters::{blend, enhance};
use std::fmt;

/// Enhance-then-blend contract for upscaled rasters.
pub trait QualityPass: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Sharpen detail.
    fn enhance(&self, raster: &mut Raster) -> UpscaleResult<()>;

    /// Soften the sharpened result.
    fn blend(&self, raster: &mut Raster) -> UpscaleResult<()>;

    /// Run [`enhance`](Self::enhance) then [`blend`](Self::blend).
    fn apply(&self, raster: &mut Raster) -> UpscaleResult<()> {
        self.enhance(raster)?;
        self.blend(raster)
    }
}

/// Convolution sharpening plus contrast, then a 60/40 Gaussian blend.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaquePass;

impl QualityPass for OpaquePass {
    fn name(&self) -> &'static str {
        "opaque"
    }

    fn enhance(&self, raster: &mut Raster) -> UpscaleResult<()> {
        enhance::sharpen(raster)
    }

    fn blend(&self, raster: &mut Raster) -> UpscaleResult<()> {
        blend::soften(raster)
    }
}

/// Local contrast push, then a 70/30 blend over visible neighbours only.
/// Alpha is never modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaPass;

impl QualityPass for AlphaPass {
    fn name(&self) -> &'static str {
        "alpha"
    }

    fn enhance(&self, raster: &mut Raster) -> UpscaleResult<()> {
        enhance::push_local_contrast(raster);
        Ok(())
    }

    fn blend(&self, raster: &mut Raster) -> UpscaleResult<()> {
        blend::soften_preserving_alpha(raster)
    }
}

/// Pick the pass matching an image's transparency.
pub fn select_pass(has_transparency: bool) -> Box<dyn QualityPass> {
    if has_transparency {
        Box::new(AlphaPass)
    } else {
        Box::new(OpaquePass)
    }
}
