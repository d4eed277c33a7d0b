//! Bitmaps: immutable grids of packed colors
//!
//! Pixels live in shared `Arc<[Color]>` storage, so cloning a bitmap is
//! cheap and never copies pixel data. Nothing mutates a bitmap once it
//! has been built.

use std::path::Path;
use std::sync::Arc;

use crate::color::{argb, Color, TRANSPARENT};
use crate::error::{Error, Result};

/// A row-major image of `width * height` colors, origin top-left
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Arc<[Color]>,
    translucent: bool,
}

impl Bitmap {
    /// Create a fully transparent bitmap
    pub fn new(width: u32, height: u32) -> Self {
        Self::solid(width, height, TRANSPARENT)
    }

    /// Create a bitmap filled with a single color
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize].into(),
            translucent: false,
        }
    }

    /// Zero-sized bitmap, used when a resource cannot be loaded
    pub fn empty() -> Self {
        Self::new(0, 0)
    }

    /// Create a bitmap from raw `0xAARRGGBB` pixels.
    /// Fails unless `pixels.len() == width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
            translucent: false,
        })
    }

    /// Convert a decoded RGBA image into packed ARGB
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let pixels: Vec<Color> = img
            .pixels()
            .map(|p| argb(p[3], p[0], p[1], p[2]))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels: pixels.into(),
            translucent: false,
        }
    }

    /// Decode an image file (any format the `image` crate was built with)
    pub fn try_open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let img = image::load_from_memory(&bytes).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let bitmap = Self::from_rgba_image(&img.to_rgba8());
        log::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            bitmap.width,
            bitmap.height
        );
        Ok(bitmap)
    }

    /// Decode an image file, falling back to an empty bitmap on failure.
    /// The failure is logged; drawing an empty bitmap is a no-op.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::try_open(path).unwrap_or_else(|e| {
            log::error!("The image could not be read: {}", e);
            Self::empty()
        })
    }

    /// Mark the bitmap as partially transparent. Translucent bitmaps are
    /// queued by the rasterizer and composited in depth order.
    pub fn with_translucency(mut self, translucent: bool) -> Self {
        self.translucent = translucent;
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.translucent
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Read a pixel by coordinates.
    /// Only the linear index `x + y * width` is checked against the storage.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Color> {
        let index = x as usize + y as usize * self.width as usize;
        self.pixels
            .get(index)
            .copied()
            .ok_or(Error::PixelOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            })
    }

    /// Nearest-neighbor sample with normalized coordinates in `[0, 1)`.
    /// Coordinates are clamped to the last row/column; an index that still
    /// lands outside the storage yields a transparent pixel.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let w = self.width as i64;
        let h = self.height as i64;
        let sx = ((u * self.width as f32) as i64).min(w - 1);
        let sy = ((v * self.height as f32) as i64).min(h - 1);
        let index = sx + sy * w;

        if index < 0 || index as usize >= self.pixels.len() {
            log::warn!(
                "Sample ({}, {}) outside of {}x{}",
                u,
                v,
                self.width,
                self.height
            );
            return TRANSPARENT;
        }
        self.pixels[index as usize]
    }
}

impl Default for Bitmap {
    fn default() -> Self {
        Self::empty()
    }
}
