//! Edge enhancement: convolution sharpening for opaque rasters and a
//! per-pixel local contrast push for rasters whose alpha must survive.

use crate::core::error::UpscaleResult;
use crate::core::types::{Raster, ALPHA_TRANSPARENT};
use crate::filters::kernel::Kernel;
use image::Rgba;

/// Contrast boost applied after sharpening, on a 0-100 scale.
pub const CONTRAST_BOOST: f32 = 15.0;

/// Intensity above which a pixel is pushed toward white.
pub const INTENSITY_THRESHOLD: u32 = 128;

/// Per-channel step of the local contrast push.
pub const LOCAL_CONTRAST_STEP: u8 = 10;

/// Sharpen with [`Kernel::SHARPEN`], then raise contrast by
/// [`CONTRAST_BOOST`].
pub fn sharpen(raster: &mut Raster) -> UpscaleResult<()> {
    let sharpened = Kernel::SHARPEN.convolve(raster.image());
    raster.replace_image(sharpened);
    image::imageops::colorops::contrast_in_place(raster.image_mut(), CONTRAST_BOOST);
    Ok(())
}

/// Push every visible pixel away from mid-grey by [`LOCAL_CONTRAST_STEP`].
///
/// Pixels brighter than [`INTENSITY_THRESHOLD`] get brighter, the rest get
/// darker. Fully transparent pixels are skipped and alpha is never touched.
/// Each pixel depends only on itself, so the pass is order independent.
pub fn push_local_contrast(raster: &mut Raster) {
    for pixel in raster.image_mut().pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        if a == ALPHA_TRANSPARENT {
            continue;
        }

        let intensity = (r as u32 + g as u32 + b as u32) / 3;
        let adjust = |c: u8| {
            if intensity > INTENSITY_THRESHOLD {
                c.saturating_add(LOCAL_CONTRAST_STEP)
            } else {
                c.saturating_sub(LOCAL_CONTRAST_STEP)
            }
        };
        *pixel = Rgba([adjust(r), adjust(g), adjust(b), a]);
    }
}
