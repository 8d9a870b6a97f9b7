//! Area-averaging resampler.
//!
//! Every destination pixel is the coverage-weighted mean of the source
//! pixels lying under its footprint. Colour is additionally weighted by
//! source alpha so transparent pixels do not bleed their (invisible) colour
//! into visible neighbours; alpha itself is weighted by coverage only. A
//! footprint with no visible source pixel becomes transparent black. For
//! integer upscale factors each footprint falls inside a single source pixel,
//! so every `F x F` block reproduces its (visible) source pixel exactly.

use crate::core::error::{UpscaleError, UpscaleResult};
use crate::core::types::Raster;
use image::Rgba;

/// Coverage below this is floating-point noise from the span arithmetic.
const MIN_COVERAGE: f64 = 1e-9;

/// Upscale `raster` by the positive integer `factor`.
pub fn upscale(raster: &Raster, factor: u32) -> UpscaleResult<Raster> {
    if factor == 0 {
        return Err(UpscaleError::InvalidScaleFactor(factor));
    }

    let (width, height) = raster.dimensions();
    let (dst_width, dst_height) = match (width.checked_mul(factor), height.checked_mul(factor)) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(UpscaleError::AllocationFailure {
                width: width as u64 * factor as u64,
                height: height as u64 * factor as u64,
            })
        }
    };

    log::debug!(
        "Resampling {}x{} -> {}x{} (factor {})",
        width,
        height,
        dst_width,
        dst_height,
        factor
    );
    resample_area(raster, dst_width, dst_height)
}

/// Resample `raster` to an arbitrary size by area averaging.
pub fn resample_area(raster: &Raster, dst_width: u32, dst_height: u32) -> UpscaleResult<Raster> {
    let mut dst = Raster::allocate(dst_width, dst_height, raster.format())?;
    let src = raster.image();

    let x_spans = spans(raster.width(), dst_width);
    let y_spans = spans(raster.height(), dst_height);

    for (dy, y_span) in y_spans.iter().enumerate() {
        for (dx, x_span) in x_spans.iter().enumerate() {
            let mut color = [0.0f64; 3];
            let mut alpha_sum = 0.0;
            let mut visible_weight = 0.0;
            let mut area = 0.0;

            for &(sy, wy) in y_span {
                for &(sx, wx) in x_span {
                    let coverage = wx * wy;
                    let pixel = src.get_pixel(sx, sy);
                    let weight = coverage * pixel[3] as f64 / 255.0;
                    for c in 0..3 {
                        color[c] += pixel[c] as f64 * weight;
                    }
                    alpha_sum += pixel[3] as f64 * coverage;
                    visible_weight += weight;
                    area += coverage;
                }
            }

            // Nothing visible under the footprint: transparent black.
            if visible_weight <= MIN_COVERAGE {
                dst.put_pixel(dx as u32, dy as u32, Rgba([0, 0, 0, 0]));
                continue;
            }
            let channel = |v: f64| (v / visible_weight).round().clamp(0.0, 255.0) as u8;
            let alpha = (alpha_sum / area).round().clamp(0.0, 255.0) as u8;

            dst.put_pixel(
                dx as u32,
                dy as u32,
                Rgba([channel(color[0]), channel(color[1]), channel(color[2]), alpha]),
            );
        }
    }

    Ok(dst)
}

/// For each destination index, the source indices it overlaps and by how much.
fn spans(src_len: u32, dst_len: u32) -> Vec<Vec<(u32, f64)>> {
    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * ratio;
            let end = start + ratio;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_len);
            (first..last)
                .filter_map(|s| {
                    let coverage = end.min(s as f64 + 1.0) - start.max(s as f64);
                    (coverage > MIN_COVERAGE).then_some((s, coverage))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PixelFormat;
    use proptest::prelude::*;

    fn checker(width: u32, height: u32) -> Raster {
        Raster::from_fn(width, height, PixelFormat::Rgba, |x, y| {
            Rgba([(x * 40) as u8, (y * 60) as u8, ((x + y) * 10) as u8, (255 - x * 30) as u8])
        })
        .unwrap()
    }

    #[test]
    fn test_zero_factor_rejected() {
        let raster = checker(2, 2);
        assert!(matches!(upscale(&raster, 0), Err(UpscaleError::InvalidScaleFactor(0))));
    }

    #[test]
    fn test_overflowing_factor_rejected() {
        let raster = checker(2, 2);
        assert!(matches!(
            upscale(&raster, u32::MAX),
            Err(UpscaleError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_integer_upscale_replicates_blocks() {
        let raster = checker(3, 2);
        let out = upscale(&raster, 3).unwrap();
        assert_eq!(out.dimensions(), (9, 6));
        assert_eq!(out.format(), PixelFormat::Rgba);
        for y in 0..6 {
            for x in 0..9 {
                assert_eq!(out.get_pixel(x, y), raster.get_pixel(x / 3, y / 3), "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_transparent_footprint_becomes_transparent_black() {
        let raster = Raster::filled(1, 1, PixelFormat::Rgba, Rgba([12, 34, 56, 0])).unwrap();
        let out = upscale(&raster, 2).unwrap();
        assert_eq!(out.dimensions(), (2, 2));
        assert!(out.image().pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_downscale_averages_area() {
        let raster = Raster::from_fn(2, 1, PixelFormat::Rgb, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([200, 100, 50, 255])
            }
        })
        .unwrap();
        let out = resample_area(&raster, 1, 1).unwrap();
        assert_eq!(out.get_pixel(0, 0), Rgba([100, 50, 25, 255]));
    }

    #[test]
    fn test_colour_weighted_by_alpha() {
        let raster = Raster::from_fn(2, 1, PixelFormat::Rgba, |x, _| {
            if x == 0 {
                Rgba([255, 0, 0, 0])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
        .unwrap();
        let out = resample_area(&raster, 1, 1).unwrap();
        // The invisible red contributes nothing to colour, half to alpha.
        assert_eq!(out.get_pixel(0, 0), Rgba([0, 0, 255, 128]));
    }

    #[test]
    fn test_spans_cover_source_exactly() {
        for (src, dst) in [(3u32, 7u32), (5, 2), (4, 12)] {
            let total: f64 = spans(src, dst).iter().flatten().map(|&(_, c)| c).sum();
            assert!((total - src as f64).abs() < 1e-6);
        }
    }

    proptest! {
        #[test]
        fn prop_upscale_dimensions(w in 1u32..6, h in 1u32..6, factor in 1u32..6) {
            let raster = checker(w, h);
            let out = upscale(&raster, factor).unwrap();
            prop_assert_eq!(out.dimensions(), (w * factor, h * factor));
            prop_assert_eq!(out.image().as_raw().len(), (w * factor * h * factor * 4) as usize);
        }

        #[test]
        fn prop_resample_any_size(w in 1u32..6, h in 1u32..6, dw in 1u32..10, dh in 1u32..10) {
            let out = resample_area(&checker(w, h), dw, dh).unwrap();
            prop_assert_eq!(out.dimensions(), (dw, dh));
        }
    }
}
