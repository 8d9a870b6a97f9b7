//! Transparency classification.

use crate::core::types::{SourceFormat, ALPHA_OPAQUE};

/// Whether images of this source format carry meaningful transparency.
///
/// Formats with a native alpha channel always do. Palette-indexed sources
/// do when at least one palette entry is not fully opaque; this inspects
/// the palette only, never the pixels.
pub fn has_transparency(format: &SourceFormat) -> bool {
    match format {
        SourceFormat::Rgb => false,
        SourceFormat::Rgba => true,
        SourceFormat::Indexed(palette) => palette
            .entries()
            .iter()
            .any(|entry| entry[3] != ALPHA_OPAQUE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Palette;
    use image::Rgba;

    #[test]
    fn test_native_alpha_always_transparent() {
        assert!(has_transparency(&SourceFormat::Rgba));
        assert!(!has_transparency(&SourceFormat::Rgb));
    }

    #[test]
    fn test_opaque_palette() {
        let palette = Palette::new(vec![Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255])]);
        let format = SourceFormat::Indexed(palette);
        assert!(!has_transparency(&format));
        // Classification is a pure function of the format.
        assert_eq!(has_transparency(&format), has_transparency(&format));
    }

    #[test]
    fn test_palette_with_transparent_entry() {
        let palette = Palette::from_rgb_triplets(&[1, 2, 3, 4, 5, 6, 7, 8, 9], Some(2));
        assert!(has_transparency(&SourceFormat::Indexed(palette)));
    }

    #[test]
    fn test_partially_transparent_entry_counts() {
        let palette = Palette::new(vec![Rgba([9, 9, 9, 255]), Rgba([9, 9, 9, 200])]);
        assert!(has_transparency(&SourceFormat::Indexed(palette)));
    }

    #[test]
    fn test_empty_palette_is_opaque() {
        assert!(!has_transparency(&SourceFormat::Indexed(Palette::default())));
    }
}
