//! Sprite sheets cut into a regular grid of equally sized tiles

use std::path::Path;

use crate::bitmap::Bitmap;
use crate::color::{Color, WHITE};

/// Filler for tile pixels that fall outside the sheet's storage
pub const TILE_FILLER: Color = WHITE;

/// A bitmap partitioned into `tile_width x tile_height` cells.
///
/// Holds its own `Bitmap` handle; the pixel storage is shared with the
/// bitmap it was built from and is never mutated.
#[derive(Clone, Debug)]
pub struct TiledBitmap {
    sheet: Bitmap,
    tile_width: u32,
    tile_height: u32,
}

impl TiledBitmap {
    pub fn new(sheet: Bitmap, tile_width: u32, tile_height: u32) -> Self {
        if tile_width == 0 || tile_height == 0 {
            log::warn!("Tile size {}x{} has no pixels", tile_width, tile_height);
        } else if sheet.width() % tile_width != 0 || sheet.height() % tile_height != 0 {
            log::warn!(
                "Sheet {}x{} is not a multiple of tile size {}x{}",
                sheet.width(),
                sheet.height(),
                tile_width,
                tile_height
            );
        }
        Self {
            sheet,
            tile_width,
            tile_height,
        }
    }

    /// Load a sheet from disk; an unreadable file gives an empty sheet
    pub fn open(path: impl AsRef<Path>, tile_width: u32, tile_height: u32) -> Self {
        Self::new(Bitmap::open(path), tile_width, tile_height)
    }

    #[inline]
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    #[inline]
    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    #[inline]
    pub fn sheet(&self) -> &Bitmap {
        &self.sheet
    }

    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.sheet.is_translucent()
    }

    pub fn tiles_per_row(&self) -> u32 {
        self.sheet.width().checked_div(self.tile_width).unwrap_or(0)
    }

    pub fn tiles_per_column(&self) -> u32 {
        self.sheet.height().checked_div(self.tile_height).unwrap_or(0)
    }

    pub fn tile_count(&self) -> u32 {
        self.tiles_per_row() * self.tiles_per_column()
    }

    /// Copy the tile at grid cell `(tile_x, tile_y)` into a new bitmap.
    ///
    /// Source indices past the end of the sheet become [`TILE_FILLER`],
    /// so tiles hanging off the sheet are still well defined.
    pub fn tile(&self, tile_x: u32, tile_y: u32) -> Bitmap {
        let tw = self.tile_width as u64;
        let th = self.tile_height as u64;
        let sheet_width = self.sheet.width() as u64;
        let src = self.sheet.pixels();

        let mut pixels = Vec::with_capacity((tw * th) as usize);
        for y in 0..th {
            for x in 0..tw {
                let index = (x + tile_x as u64 * tw) + (y + tile_y as u64 * th) * sheet_width;
                let color = usize::try_from(index)
                    .ok()
                    .and_then(|i| src.get(i).copied())
                    .unwrap_or(TILE_FILLER);
                pixels.push(color);
            }
        }

        // Length is tw * th by construction
        Bitmap::from_pixels(self.tile_width, self.tile_height, pixels)
            .unwrap_or_else(|_| Bitmap::empty())
            .with_translucency(self.sheet.is_translucent())
    }

    /// Copy a tile by linear index, counting left to right, top to bottom
    pub fn tile_at(&self, index: u32) -> Bitmap {
        let per_row = self.tiles_per_row();
        if per_row == 0 {
            log::warn!(
                "Sheet {}x{} holds no {}px wide tiles, using tile 0",
                self.sheet.width(),
                self.sheet.height(),
                self.tile_width
            );
            return self.tile(0, 0);
        }
        self.tile(index % per_row, index / per_row)
    }
}
