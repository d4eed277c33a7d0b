//! Bitmap fonts sliced from a single-row glyph atlas
//!
//! The atlas is one strip of glyph sprites. Row 0 carries marker pixels:
//! [`GLYPH_START`] where a glyph begins and [`GLYPH_END`] one past where it
//! ends. Glyph codes are assigned left to right from 0, so for an ASCII
//! atlas code 65 is the 66th glyph in the strip. Glyph pixels equal to
//! [`GLYPH_INK`] are drawn; everything else is background.

use std::path::Path;

use crate::bitmap::Bitmap;
use crate::color::Color;

/// Marker for the first column of a glyph
pub const GLYPH_START: Color = 0xFF00_00FF;
/// Marker closing the current glyph
pub const GLYPH_END: Color = 0xFFFF_FF00;
/// Stencil color: glyph pixels with this value are inked
pub const GLYPH_INK: Color = 0xFFFF_FFFF;
/// Number of glyph codes a font can address
pub const GLYPH_TABLE_SIZE: usize = 256;

#[derive(Clone, Debug)]
pub struct Font {
    atlas: Bitmap,
    offsets: [u32; GLYPH_TABLE_SIZE],
    widths: [u32; GLYPH_TABLE_SIZE],
    glyph_count: usize,
}

impl Font {
    /// Build the glyph tables by scanning row 0 of `atlas`.
    ///
    /// A malformed atlas is not an error: glyphs that never see an end
    /// marker keep width 0 and simply draw nothing.
    pub fn from_atlas(atlas: Bitmap) -> Self {
        let mut offsets = [0u32; GLYPH_TABLE_SIZE];
        let mut widths = [0u32; GLYPH_TABLE_SIZE];
        let mut code = 0usize;

        let row_len = (atlas.width() as usize).min(atlas.pixels().len());
        for (i, &pixel) in atlas.pixels()[..row_len].iter().enumerate() {
            let is_marker = pixel == GLYPH_START || pixel == GLYPH_END;
            if is_marker && code >= GLYPH_TABLE_SIZE {
                log::warn!(
                    "Font atlas has more than {} glyphs, ignoring the rest",
                    GLYPH_TABLE_SIZE
                );
                break;
            }
            let i = i as u32;
            if pixel == GLYPH_START {
                offsets[code] = i;
            } else if pixel == GLYPH_END {
                widths[code] = i - offsets[code];
                code += 1;
            }
        }

        log::debug!(
            "Font atlas {}x{}: {} glyphs",
            atlas.width(),
            atlas.height(),
            code
        );

        Self {
            atlas,
            offsets,
            widths,
            glyph_count: code,
        }
    }

    /// Load an atlas image; an unreadable file gives a font with no glyphs
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::from_atlas(Bitmap::open(path))
    }

    #[inline]
    pub fn atlas(&self) -> &Bitmap {
        &self.atlas
    }

    /// Glyph height, which is the atlas height
    #[inline]
    pub fn height(&self) -> u32 {
        self.atlas.height()
    }

    /// Number of glyphs closed by an end marker
    #[inline]
    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Start column of a glyph in the atlas (0 for unknown codes)
    pub fn offset(&self, code: u32) -> u32 {
        self.offsets.get(code as usize).copied().unwrap_or(0)
    }

    /// Advance width of a glyph (0 for unknown codes)
    pub fn width(&self, code: u32) -> u32 {
        self.widths.get(code as usize).copied().unwrap_or(0)
    }

    /// Total advance of a string, no kerning
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars().map(|c| self.width(c as u32)).sum()
    }

    /// Copy a glyph's `width x height` block out of the atlas
    pub fn glyph(&self, code: u32) -> Bitmap {
        let w = self.width(code) as usize;
        let h = self.atlas.height() as usize;
        let offset = self.offset(code) as usize;
        let atlas_width = self.atlas.width() as usize;
        let src = self.atlas.pixels();

        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            let row = offset + y * atlas_width;
            pixels.extend_from_slice(&src[row..row + w]);
        }

        Bitmap::from_pixels(w as u32, h as u32, pixels).unwrap_or_else(|e| {
            log::warn!("Glyph {} could not be sliced: {}", code, e);
            Bitmap::empty()
        })
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::from_atlas(Bitmap::empty())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::BLACK;

    const BG: Color = BLACK;
    const INK: Color = GLYPH_INK;
    const S: Color = GLYPH_START;
    const E: Color = GLYPH_END;

    /// Two glyphs, 3 rows high.
    ///
    /// Glyph 0 spans columns 0..2 (end marker at column 2), glyph 1 spans
    /// columns 3..6 (end marker at column 6). Glyph 0 is a vertical bar in
    /// column 0, glyph 1 inks its first column on every row.
    pub(crate) fn two_glyph_atlas() -> Bitmap {
        #[rustfmt::skip]
        let pixels = vec![
            S,   BG, E,  S,   BG, BG, E,
            INK, BG, BG, INK, BG, BG, BG,
            INK, BG, BG, INK, BG, INK, BG,
        ];
        Bitmap::from_pixels(7, 3, pixels).unwrap()
    }

    #[test]
    fn test_tables_from_markers() {
        let font = Font::from_atlas(two_glyph_atlas());
        assert_eq!(font.glyph_count(), 2);
        assert_eq!(font.offset(0), 0);
        assert_eq!(font.width(0), 2);
        assert_eq!(font.offset(1), 3);
        assert_eq!(font.width(1), 3);
        assert_eq!(font.width(2), 0);
    }

    #[test]
    fn test_glyph_slices_block() {
        let font = Font::from_atlas(two_glyph_atlas());
        let glyph = font.glyph(1);
        assert_eq!(glyph.width(), 3);
        assert_eq!(glyph.height(), 3);
        assert_eq!(glyph.pixels(), &[S, BG, BG, INK, BG, BG, INK, BG, INK]);
    }

    #[test]
    fn test_missing_end_marker_leaves_zero_width() {
        let atlas = Bitmap::from_pixels(4, 1, vec![S, BG, E, S]).unwrap();
        let font = Font::from_atlas(atlas);
        assert_eq!(font.glyph_count(), 1);
        assert_eq!(font.width(1), 0);
        assert!(font.glyph(1).is_empty());
    }

    #[test]
    fn test_unknown_code_is_zero_width() {
        let font = Font::from_atlas(two_glyph_atlas());
        assert_eq!(font.width(0x263A), 0);
        assert!(font.glyph(0x263A).is_empty());
    }

    #[test]
    fn test_text_width_sums_advances() {
        let font = Font::from_atlas(two_glyph_atlas());
        assert_eq!(font.text_width("\u{0}\u{1}\u{0}"), 7);
    }

    #[test_log::test]
    fn test_missing_atlas_file_gives_empty_font() {
        let font = Font::open("no/such/font.png");
        assert_eq!(font.glyph_count(), 0);
        assert_eq!(font.text_width("hello"), 0);
    }
}
