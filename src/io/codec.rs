//! Decoding source bytes into rasters and encoding finished rasters.
//!
//! JPEG and PNG go through the `image` crate. GIF is read with the `gif`
//! crate directly so the palette and transparent index survive decoding;
//! the transparent index becomes alpha 0 and every other entry alpha 255.

use crate::core::config::{EncodeOptions, PngCompression};
use crate::core::error::{UpscaleError, UpscaleResult};
use crate::core::types::{ImageKind, Palette, PixelFormat, Raster, SourceFormat};
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// Quantizer speed for GIF output (1 = best quality, 30 = fastest).
const GIF_QUANT_SPEED: i32 = 10;

/// A decoded source image.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub raster: Raster,
    pub format: SourceFormat,
    pub kind: ImageKind,
}

/// Decode `bytes`, identifying the encoding from its signature.
pub fn decode(bytes: &[u8]) -> UpscaleResult<Decoded> {
    let kind = ImageKind::sniff(bytes)?;
    decode_as(bytes, kind)
}

/// Decode `bytes` known to be of `kind`.
pub fn decode_as(bytes: &[u8], kind: ImageKind) -> UpscaleResult<Decoded> {
    let (raster, format) = match kind {
        ImageKind::Gif => decode_gif(bytes)?,
        ImageKind::Jpeg | ImageKind::Png => decode_truecolor(bytes, kind)?,
    };
    log::debug!(
        "Decoded {} source: {}x{} {}",
        kind,
        raster.width(),
        raster.height(),
        format
    );
    Ok(Decoded { raster, format, kind })
}

fn decode_truecolor(bytes: &[u8], kind: ImageKind) -> UpscaleResult<(Raster, SourceFormat)> {
    let img = image::load_from_memory_with_format(bytes, kind.image_format())
        .map_err(|e| UpscaleError::DecodeFailure(e.to_string()))?;

    let has_alpha = kind == ImageKind::Png && img.color().has_alpha();
    let (pixel_format, source_format) = if has_alpha {
        (PixelFormat::Rgba, SourceFormat::Rgba)
    } else {
        (PixelFormat::Rgb, SourceFormat::Rgb)
    };

    let raster = Raster::from_image(img.to_rgba8(), pixel_format)?;
    Ok((raster, source_format))
}

/// Read the first frame of a GIF, keeping its palette.
fn decode_gif(bytes: &[u8]) -> UpscaleResult<(Raster, SourceFormat)> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);

    let mut decoder = options
        .read_info(Cursor::new(bytes))
        .map_err(|e| UpscaleError::DecodeFailure(format!("GIF decode error: {}", e)))?;

    let frame = decoder
        .read_next_frame()
        .map_err(|e| UpscaleError::DecodeFailure(format!("GIF frame error: {}", e)))?
        .ok_or_else(|| UpscaleError::DecodeFailure("no frames in GIF".to_string()))?
        .clone();

    // Prefer the local palette, fall back to the global one.
    let palette_bytes = frame
        .palette
        .as_deref()
        .or_else(|| decoder.global_palette())
        .ok_or_else(|| UpscaleError::DecodeFailure("GIF has no color map".to_string()))?;
    let palette = Palette::from_rgb_triplets(palette_bytes, frame.transparent);
    if palette.is_empty() {
        return Err(UpscaleError::DecodeFailure("GIF color map is empty".to_string()));
    }

    let screen_width = (decoder.width() as u32).max(1);
    let screen_height = (decoder.height() as u32).max(1);
    let left = frame.left as u32;
    let top = frame.top as u32;
    let frame_width = frame.width as u32;
    let frame_height = frame.height as u32;

    // Area outside the first frame shows the transparent entry when there
    // is one, otherwise the first palette entry.
    let background = frame
        .transparent
        .and_then(|index| palette.get(index as usize))
        .or_else(|| palette.get(0))
        .unwrap_or(Rgba([0, 0, 0, 0]));

    let mut pixels = RgbaImage::from_pixel(screen_width, screen_height, background);
    for (i, &index) in frame.buffer.iter().enumerate() {
        let x = left + (i as u32 % frame_width.max(1));
        let y = top + (i as u32 / frame_width.max(1));
        if x >= screen_width || y >= screen_height || y >= top + frame_height {
            continue;
        }
        let color = palette.get(index as usize).ok_or_else(|| {
            UpscaleError::DecodeFailure(format!(
                "palette index {} out of range ({} colors)",
                index,
                palette.len()
            ))
        })?;
        pixels.put_pixel(x, y, color);
    }

    let transparent = frame.transparent.is_some();
    let pixel_format = if transparent { PixelFormat::Rgba } else { PixelFormat::Rgb };
    let raster = Raster::from_image(pixels, pixel_format)?;
    Ok((raster, SourceFormat::Indexed(palette)))
}

/// Encode `raster` as `kind`.
pub fn encode(raster: &Raster, kind: ImageKind, options: &EncodeOptions) -> UpscaleResult<Vec<u8>> {
    let mut bytes = Vec::new();
    match kind {
        ImageKind::Jpeg => encode_jpeg(raster, options.jpeg_quality, &mut bytes)?,
        ImageKind::Png => encode_png(raster, options.png_compression, &mut bytes)?,
        ImageKind::Gif => encode_gif(raster, &mut bytes)?,
    }
    log::debug!("Encoded {}x{} {} ({} bytes)", raster.width(), raster.height(), kind, bytes.len());
    Ok(bytes)
}

fn encode_jpeg(raster: &Raster, quality: u8, out: &mut Vec<u8>) -> UpscaleResult<()> {
    let rgb: RgbImage = raster.image().convert();
    JpegEncoder::new_with_quality(out, quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| UpscaleError::EncodeFailure(e.to_string()))
}

fn encode_png(raster: &Raster, compression: PngCompression, out: &mut Vec<u8>) -> UpscaleResult<()> {
    let compression = match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    };
    let encoder = PngEncoder::new_with_quality(out, compression, FilterType::Adaptive);
    let (width, height) = raster.dimensions();

    let result = match raster.format() {
        PixelFormat::Rgba => encoder.write_image(
            raster.image().as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        PixelFormat::Rgb => {
            let rgb: RgbImage = raster.image().convert();
            encoder.write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        }
    };
    result.map_err(|e| UpscaleError::EncodeFailure(e.to_string()))
}

fn encode_gif(raster: &Raster, out: &mut Vec<u8>) -> UpscaleResult<()> {
    let (width, height) = raster.dimensions();
    let too_large = || {
        UpscaleError::EncodeFailure(format!(
            "{}x{} exceeds the GIF limit of 65535x65535",
            width, height
        ))
    };
    let width = u16::try_from(width).map_err(|_| too_large())?;
    let height = u16::try_from(height).map_err(|_| too_large())?;

    let mut rgba = raster.try_clone_image()?.into_raw();
    let frame = gif::Frame::from_rgba_speed(width, height, &mut rgba, GIF_QUANT_SPEED);

    let mut encoder = gif::Encoder::new(out, width, height, &[])
        .map_err(|e| UpscaleError::EncodeFailure(format!("GIF encoder error: {}", e)))?;
    encoder
        .write_frame(&frame)
        .map_err(|e| UpscaleError::EncodeFailure(format!("GIF frame error: {}", e)))
}
