//! Core value types that flow through the upscaling pipeline.
//!
//! A [`Raster`] is always stored as 8-bit RGBA, whatever the source format.
//! The [`PixelFormat`] tag remembers whether the alpha channel carries
//! information, and [`SourceFormat`] remembers which encoding family the
//! pixels came from (including the palette for indexed sources).

use crate::core::error::{UpscaleError, UpscaleResult};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Alpha value of a fully transparent sample.
pub const ALPHA_TRANSPARENT: u8 = 0;

/// Alpha value of a fully opaque sample.
pub const ALPHA_OPAQUE: u8 = 255;

/// Whether a raster's alpha channel is meaningful.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Colour only; every alpha sample is [`ALPHA_OPAQUE`].
    Rgb,
    /// Colour plus per-pixel alpha.
    Rgba,
}

impl PixelFormat {
    /// Whether this format carries an alpha channel.
    pub fn has_alpha(self) -> bool {
        self == PixelFormat::Rgba
    }
}

/// A rectangular grid of RGBA samples.
///
/// Width and height are always positive and the buffer always holds exactly
/// `width * height` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pixels: RgbaImage,
    format: PixelFormat,
}

impl Raster {
    /// Allocate a zero-filled raster, reporting allocation failure instead
    /// of aborting.
    pub fn allocate(width: u32, height: u32, format: PixelFormat) -> UpscaleResult<Self> {
        let pixels = allocate_image(width, height)?;
        Ok(Self { pixels, format })
    }

    /// Wrap an existing image buffer.
    pub fn from_image(pixels: RgbaImage, format: PixelFormat) -> UpscaleResult<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(UpscaleError::InvalidDimensions { width, height });
        }
        Ok(Self { pixels, format })
    }

    /// Build a raster by evaluating `f` at every coordinate.
    pub fn from_fn<F>(width: u32, height: u32, format: PixelFormat, f: F) -> UpscaleResult<Self>
    where
        F: FnMut(u32, u32) -> Rgba<u8>,
    {
        Self::from_image(RgbaImage::from_fn(width, height, f), format)
    }

    /// Build a raster filled with a single colour.
    pub fn filled(width: u32, height: u32, format: PixelFormat, color: Rgba<u8>) -> UpscaleResult<Self> {
        Self::from_fn(width, height, format, |_, _| color)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Number of pixels in the raster.
    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Get a pixel. Panics when out of bounds, like `ImageBuffer::get_pixel`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Rgba<u8>) {
        self.pixels.put_pixel(x, y, pixel);
    }

    /// Borrow the underlying image buffer.
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Mutably borrow the underlying image buffer.
    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Replace the pixel data, keeping the format.
    ///
    /// The replacement must have the same dimensions.
    pub(crate) fn replace_image(&mut self, pixels: RgbaImage) {
        debug_assert_eq!(pixels.dimensions(), self.pixels.dimensions());
        self.pixels = pixels;
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Copy the pixel data into a freshly allocated scratch buffer.
    pub(crate) fn try_clone_image(&self) -> UpscaleResult<RgbaImage> {
        let (width, height) = self.dimensions();
        let mut copy = allocate_image(width, height)?;
        copy.copy_from_slice(self.pixels.as_raw());
        Ok(copy)
    }
}

/// Allocate a zero-filled RGBA buffer without aborting on exhaustion.
pub(crate) fn allocate_image(width: u32, height: u32) -> UpscaleResult<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(UpscaleError::InvalidDimensions { width, height });
    }

    let failure = || UpscaleError::AllocationFailure {
        width: width as u64,
        height: height as u64,
    };

    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(failure)?;

    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| failure())?;
    buffer.resize(len, 0);

    RgbaImage::from_raw(width, height, buffer).ok_or_else(failure)
}

/// Ordered colour table of a palette-indexed source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Rgba<u8>>,
}

impl Palette {
    pub fn new(entries: Vec<Rgba<u8>>) -> Self {
        Self { entries }
    }

    /// Build a palette from packed `r, g, b` triplets.
    ///
    /// The entry at `transparent` (if any) gets alpha [`ALPHA_TRANSPARENT`];
    /// every other entry is fully opaque. Trailing bytes that do not form a
    /// whole triplet are ignored.
    pub fn from_rgb_triplets(bytes: &[u8], transparent: Option<u8>) -> Self {
        let entries = bytes
            .chunks_exact(3)
            .enumerate()
            .map(|(index, rgb)| {
                let alpha = if transparent == Some(index as u8) && index < 256 {
                    ALPHA_TRANSPARENT
                } else {
                    ALPHA_OPAQUE
                };
                Rgba([rgb[0], rgb[1], rgb[2], alpha])
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[Rgba<u8>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<Rgba<u8>> {
        self.entries.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How the source pixels were encoded before decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    /// Truecolour without an alpha channel (JPEG-like).
    Rgb,
    /// Truecolour with a native alpha channel (PNG-like).
    Rgba,
    /// Palette-indexed (GIF-like).
    Indexed(Palette),
}

impl SourceFormat {
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Rgb => "rgb",
            SourceFormat::Rgba => "rgba",
            SourceFormat::Indexed(_) => "indexed",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Indexed(palette) => write!(f, "indexed ({} colors)", palette.len()),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// File encodings the upscaler reads and writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Map a file extension (case-insensitive, without the dot).
    pub fn from_extension(extension: &str) -> UpscaleResult<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageKind::Jpeg),
            "png" => Ok(ImageKind::Png),
            "gif" => Ok(ImageKind::Gif),
            other => Err(UpscaleError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Map a path by its extension.
    pub fn from_path(path: &Path) -> UpscaleResult<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            UpscaleError::UnsupportedFormat(format!("{} has no extension", path.display()))
        })?;
        Self::from_extension(extension)
    }

    /// Identify the encoding from the leading bytes.
    pub fn sniff(bytes: &[u8]) -> UpscaleResult<Self> {
        let format = image::guess_format(bytes)
            .map_err(|e| UpscaleError::DecodeFailure(e.to_string()))?;
        Self::from_image_format(format)
    }

    pub fn from_image_format(format: image::ImageFormat) -> UpscaleResult<Self> {
        match format {
            image::ImageFormat::Jpeg => Ok(ImageKind::Jpeg),
            image::ImageFormat::Png => Ok(ImageKind::Png),
            image::ImageFormat::Gif => Ok(ImageKind::Gif),
            other => Err(UpscaleError::UnsupportedFormat(format!("{:?}", other))),
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            ImageKind::Jpeg => image::ImageFormat::Jpeg,
            ImageKind::Png => image::ImageFormat::Png,
            ImageKind::Gif => image::ImageFormat::Gif,
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
