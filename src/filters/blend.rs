//! Colour blending: soften sharpened output by mixing it with a smoothed
//! copy of itself.

use crate::core::error::UpscaleResult;
use crate::core::types::{Raster, ALPHA_TRANSPARENT};
use crate::filters::kernel::Kernel;
use image::{Rgba, RgbaImage};

/// Share of the sharpened value kept by the opaque blender.
pub const OPAQUE_KEEP: f32 = 0.6;

/// Share of the original value kept by the alpha-aware blender.
pub const ALPHA_KEEP: f32 = 0.7;

/// Blur a copy with [`Kernel::GAUSSIAN`] and mix it back in:
/// `round(0.6 * enhanced + 0.4 * blurred)` per colour channel.
pub fn soften(raster: &mut Raster) -> UpscaleResult<()> {
    let blurred = Kernel::GAUSSIAN.convolve(raster.image());
    for (pixel, smooth) in raster.image_mut().pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            pixel[c] = mix(pixel[c], smooth[c] as f32, OPAQUE_KEEP);
        }
    }
    Ok(())
}

/// Alpha-aware softening.
///
/// Each visible pixel is mixed 70/30 with the mean colour of the visible
/// pixels in its clipped 3x3 neighbourhood. Averages are computed from the
/// untouched source into a working copy, then merged back so that later
/// pixels never see already-blended neighbours. Fully transparent pixels are
/// neither read nor written, and every pixel keeps its original alpha.
pub fn soften_preserving_alpha(raster: &mut Raster) -> UpscaleResult<()> {
    let mut working = raster.try_clone_image()?;
    let source = raster.image();
    let (width, height) = source.dimensions();

    for y in 0..height {
        for x in 0..width {
            let original = *source.get_pixel(x, y);
            if original[3] == ALPHA_TRANSPARENT {
                continue;
            }
            let Some(mean) = visible_mean(source, x, y) else {
                continue;
            };
            working.put_pixel(
                x,
                y,
                Rgba([
                    mix(original[0], mean[0], ALPHA_KEEP),
                    mix(original[1], mean[1], ALPHA_KEEP),
                    mix(original[2], mean[2], ALPHA_KEEP),
                    original[3],
                ]),
            );
        }
    }

    for (pixel, blended) in raster.image_mut().pixels_mut().zip(working.pixels()) {
        if pixel[3] == ALPHA_TRANSPARENT {
            continue;
        }
        pixel[0] = blended[0];
        pixel[1] = blended[1];
        pixel[2] = blended[2];
    }
    Ok(())
}

/// Mean colour of the non-transparent pixels in the 3x3 block around
/// `(x, y)`, clipped at the image edges. `None` when none are visible.
fn visible_mean(image: &RgbaImage, x: u32, y: u32) -> Option<[f32; 3]> {
    let (width, height) = image.dimensions();
    let mut sums = [0u32; 3];
    let mut count = 0u32;

    for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
        for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
            let neighbor = image.get_pixel(nx, ny);
            if neighbor[3] == ALPHA_TRANSPARENT {
                continue;
            }
            for c in 0..3 {
                sums[c] += neighbor[c] as u32;
            }
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }
    Some(sums.map(|s| s as f32 / count as f32))
}

/// `round(keep * original + (1 - keep) * other)`, saturated to a channel.
fn mix(original: u8, other: f32, keep: f32) -> u8 {
    (original as f32 * keep + other * (1.0 - keep))
        .round()
        .clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PixelFormat;

    #[test]
    fn test_mix_rounds_to_nearest() {
        assert_eq!(mix(100, 0.0, 0.6), 60);
        assert_eq!(mix(101, 0.0, 0.7), 71); // 70.7
        assert_eq!(mix(255, 255.0, 0.7), 255);
        assert_eq!(mix(0, 0.0, 0.6), 0);
    }

    #[test]
    fn test_soften_uniform_unchanged() {
        let mut raster = Raster::filled(3, 3, PixelFormat::Rgb, Rgba([80, 160, 240, 255])).unwrap();
        let before = raster.clone();
        soften(&mut raster).unwrap();
        assert_eq!(raster, before);
    }

    #[test]
    fn test_soften_mixes_blur() {
        let mut raster = Raster::filled(3, 3, PixelFormat::Rgb, Rgba([0, 0, 0, 255])).unwrap();
        raster.put_pixel(1, 1, Rgba([160, 160, 160, 255]));
        soften(&mut raster).unwrap();
        // blurred centre = 4 * 160 / 16 = 40; 0.6 * 160 + 0.4 * 40 = 112
        assert_eq!(raster.get_pixel(1, 1), Rgba([112, 112, 112, 255]));
        // blurred corner = 160 / 16 = 10; 0.4 * 10 = 4
        assert_eq!(raster.get_pixel(0, 0), Rgba([4, 4, 4, 255]));
    }

    #[test]
    fn test_alpha_blend_ignores_transparent_neighbours() {
        // A visible pixel surrounded by bright but fully transparent pixels.
        let mut raster = Raster::filled(3, 3, PixelFormat::Rgba, Rgba([255, 255, 255, 0])).unwrap();
        raster.put_pixel(1, 1, Rgba([40, 40, 40, 200]));
        soften_preserving_alpha(&mut raster).unwrap();
        assert_eq!(raster.get_pixel(1, 1), Rgba([40, 40, 40, 200]));
        for (x, y, p) in raster.image().enumerate_pixels() {
            if (x, y) != (1, 1) {
                assert_eq!(*p, Rgba([255, 255, 255, 0]));
            }
        }
    }

    #[test]
    fn test_alpha_blend_uses_source_not_partial_results() {
        let mut raster = Raster::from_fn(3, 1, PixelFormat::Rgba, |x, _| match x {
            0 => Rgba([0, 0, 0, 255]),
            1 => Rgba([100, 100, 100, 128]),
            _ => Rgba([200, 200, 200, 255]),
        })
        .unwrap();
        soften_preserving_alpha(&mut raster).unwrap();
        // x=0: mean(0, 100) = 50 -> 0.3 * 50 = 15
        assert_eq!(raster.get_pixel(0, 0), Rgba([15, 15, 15, 255]));
        // x=1: mean(0, 100, 200) = 100 -> 100
        assert_eq!(raster.get_pixel(1, 0), Rgba([100, 100, 100, 128]));
        // x=2: mean(100, 200) = 150 -> 140 + 45 = 185
        assert_eq!(raster.get_pixel(2, 0), Rgba([185, 185, 185, 255]));
    }

    #[test]
    fn test_alpha_blend_all_transparent_unchanged() {
        let mut raster = Raster::from_fn(4, 4, PixelFormat::Rgba, |x, y| {
            Rgba([(x * 50) as u8, (y * 50) as u8, 99, 0])
        })
        .unwrap();
        let before = raster.clone();
        soften_preserving_alpha(&mut raster).unwrap();
        assert_eq!(raster, before);
    }
}
