//! The software rasterizer
//!
//! Owns the color buffer plus a per-pixel depth buffer and light buffer.
//! Everything funnels through [`Rasterizer::set_pixel`], which applies the
//! depth test and alpha rules. Translucent images are queued and only reach
//! the color buffer in [`Rasterizer::process`], which also applies lighting.
//!
//! Per frame the caller runs `clear`, any number of draws, then `process`
//! exactly once before presenting. That ordering is not checked.

use crate::bitmap::Bitmap;
use crate::color::{self, Color, BLACK, WHITE};
use crate::font::{Font, GLYPH_INK};
use crate::queue::{DeferredDrawQueue, DrawRequest};
use crate::tiled::TiledBitmap;

/// Light applied where no light source was drawn
pub const DEFAULT_AMBIENT: Color = WHITE;

// ============================================================================
// Clipping
// ============================================================================

/// Visible part of a box, in coordinates local to the box (half-open)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clip {
    x0: i32,
    x1: i32,
    y0: i32,
    y1: i32,
}

// ============================================================================
// Rasterizer
// ============================================================================

pub struct Rasterizer {
    width: u32,
    height: u32,
    color: Vec<Color>,
    depth: Vec<i32>,
    light: Vec<Color>,
    ambient: Color,
    current_depth: i32,
    pending: DeferredDrawQueue,
    processing: bool,
}

impl Rasterizer {
    /// Create a rasterizer with fixed dimensions, cleared to black
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![BLACK; len],
            depth: vec![0; len],
            light: vec![DEFAULT_AMBIENT; len],
            ambient: DEFAULT_AMBIENT,
            current_depth: 0,
            pending: DeferredDrawQueue::new(),
            processing: false,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Buffer index for (x, y), or None when outside the buffer
    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(x as usize + y as usize * self.width as usize)
        } else {
            None
        }
    }

    /// Reject a `w x h` box at (x, y) lying fully outside the buffer,
    /// otherwise return its visible part
    fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<Clip> {
        let bw = self.width as i32;
        let bh = self.height as i32;
        if w <= 0 || h <= 0 {
            return None;
        }
        if x.saturating_add(w) <= 0 || y.saturating_add(h) <= 0 || x >= bw || y >= bh {
            return None;
        }
        Some(Clip {
            x0: if x < 0 { -x } else { 0 },
            x1: w.min(bw - x),
            y0: if y < 0 { -y } else { 0 },
            y1: h.min(bh - y),
        })
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Depth tag stamped on everything drawn until it changes
    #[inline]
    pub fn depth(&self) -> i32 {
        self.current_depth
    }

    #[inline]
    pub fn set_depth(&mut self, depth: i32) {
        self.current_depth = depth;
    }

    #[inline]
    pub fn ambient_color(&self) -> Color {
        self.ambient
    }

    /// Light used for pixels no light source touches; takes effect at the
    /// next `clear`
    #[inline]
    pub fn set_ambient_color(&mut self, color: Color) {
        self.ambient = color;
    }

    /// Number of translucent draws waiting for `process`
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// True only while `process` flushes the translucent queue
    #[inline]
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// The color buffer, row-major
    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.color
    }

    /// The color buffer as native-endian bytes (ARGB8888 / RGB888 packed)
    pub fn as_bytes(&self) -> &[u8] {
        // Safety: u32 has no padding and every byte pattern is a valid u8.
        // The slice covers exactly the color buffer's allocation.
        unsafe {
            std::slice::from_raw_parts(self.color.as_ptr().cast::<u8>(), self.color.len() * 4)
        }
    }

    /// Read a pixel (bounds checked)
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.color[i])
    }

    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<i32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    #[inline]
    pub fn light_at(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.light[i])
    }

    // ========================================================================
    // Frame lifecycle
    // ========================================================================

    /// Reset color to `color`, depth to 0 and light to the ambient color
    pub fn clear(&mut self, color: Color) {
        self.color.fill(color);
        self.depth.fill(0);
        self.light.fill(self.ambient);
    }

    /// Clear to opaque black
    pub fn clear_black(&mut self) {
        self.clear(BLACK);
    }

    /// Finish the frame: composite queued translucent images in ascending
    /// depth order, then multiply every pixel by its light.
    pub fn process(&mut self) {
        self.processing = true;
        let caller_depth = self.current_depth;

        let requests = self.pending.drain_sorted();
        if !requests.is_empty() {
            log::trace!("Compositing {} translucent draws", requests.len());
        }
        for request in &requests {
            self.current_depth = request.depth;
            self.draw_image_with(&request.bitmap, request.x, request.y, request.recolor);
        }
        self.current_depth = caller_depth;

        for (c, &l) in self.color.iter_mut().zip(&self.light) {
            *c = color::modulate(*c, l);
        }

        self.pending.clear();
        self.processing = false;
    }

    // ========================================================================
    // Pixels
    // ========================================================================

    /// Write one pixel with depth test and alpha.
    ///
    /// Skipped when out of bounds, fully transparent, or when the pixel
    /// already holds a greater depth. Equal depth overwrites.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, value: Color) {
        let a = color::alpha(value);
        if a == 0 {
            return;
        }
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.depth[i] > self.current_depth {
            return;
        }
        self.depth[i] = self.current_depth;
        self.color[i] = if a == 255 {
            value
        } else {
            color::blend(self.color[i], value)
        };
    }

    /// Add a light at one pixel. Lights combine by per-channel maximum.
    #[inline]
    pub fn set_light_map(&mut self, x: i32, y: i32, value: Color) {
        if let Some(i) = self.index(x, y) {
            self.light[i] = color::max_channels(self.light[i], value);
        }
    }

    /// Inclusive horizontal span, clamped to the row
    fn span(&mut self, x_start: i32, x_end: i32, y: i32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let start = x_start.max(0);
        let end = x_end.min(self.width as i32 - 1);
        for x in start..=end {
            self.set_pixel(x, y, color);
        }
    }

    // ========================================================================
    // Lines
    // ========================================================================

    /// Bresenham line, both endpoints included
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        let dx = x2 - x1;
        let dy = y2 - y1;

        if dx == 0 {
            if x1 < 0 || x1 >= self.width as i32 {
                return;
            }
            let (top, bottom) = if y2 < y1 { (y2, y1) } else { (y1, y2) };
            for y in top.max(0)..=bottom.min(self.height as i32 - 1) {
                self.set_pixel(x1, y, color);
            }
            return;
        }

        if dy == 0 {
            self.span(x1.min(x2), x1.max(x2), y1, color);
            return;
        }

        let dx1 = dx.abs();
        let dy1 = dy.abs();
        // Direction of the minor axis when walking the major axis forward
        let step = if (dx < 0) == (dy < 0) { 1 } else { -1 };

        if dy1 <= dx1 {
            let mut err = 2 * dy1 - dx1;
            let (mut x, mut y, x_end) = if dx >= 0 { (x1, y1, x2) } else { (x2, y2, x1) };
            self.set_pixel(x, y, color);
            while x < x_end {
                x += 1;
                if err < 0 {
                    err += 2 * dy1;
                } else {
                    y += step;
                    err += 2 * (dy1 - dx1);
                }
                self.set_pixel(x, y, color);
            }
        } else {
            let mut err = 2 * dx1 - dy1;
            let (mut x, mut y, y_end) = if dy >= 0 { (x1, y1, y2) } else { (x2, y2, y1) };
            self.set_pixel(x, y, color);
            while y < y_end {
                y += 1;
                if err <= 0 {
                    err += 2 * dx1;
                } else {
                    x += step;
                    err += 2 * (dx1 - dy1);
                }
                self.set_pixel(x, y, color);
            }
        }
    }

    // ========================================================================
    // Rectangles
    // ========================================================================

    /// Rectangle outline spanning columns `x..=x+w` and rows `y..=y+h`.
    /// Rejected when fully off screen, otherwise clipped to the buffer.
    pub fn draw_rectangle(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let Some(c) = self.clip(x, y, w.saturating_add(1), h.saturating_add(1)) else {
            return;
        };
        for ly in c.y0..c.y1 {
            self.set_pixel(x, y + ly, color);
            self.set_pixel(x + w, y + ly, color);
        }
        for lx in c.x0..c.x1 {
            self.set_pixel(x + lx, y, color);
            self.set_pixel(x + lx, y + h, color);
        }
    }

    /// Filled rectangle covering `[x, x+w) x [y, y+h)`.
    /// Rejected when fully off screen, otherwise clipped to the buffer.
    pub fn fill_rectangle(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let Some(c) = self.clip(x, y, w, h) else {
            return;
        };
        for ly in c.y0..c.y1 {
            for lx in c.x0..c.x1 {
                self.set_pixel(x + lx, y + ly, color);
            }
        }
    }

    /// Rectangle outline from four lines between `(x, y)` and `(x+w, y+h)`.
    /// No rejection step; each line clips per pixel.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.draw_line(x, y, x + w, y, color);
        self.draw_line(x + w, y, x + w, y + h, color);
        self.draw_line(x + w, y + h, x, y + h, color);
        self.draw_line(x, y + h, x, y, color);
    }

    /// Filled rectangle whose corners are clamped into `[0, width] x
    /// [0, height]` before filling `[x, x2) x [y, y2)`.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let bw = self.width as i32;
        let bh = self.height as i32;
        let x2 = x.saturating_add(w).clamp(0, bw);
        let y2 = y.saturating_add(h).clamp(0, bh);
        let x = x.clamp(0, bw);
        let y = y.clamp(0, bh);

        for px in x..x2 {
            for py in y..y2 {
                self.set_pixel(px, py, color);
            }
        }
    }

    // ========================================================================
    // Circles
    // ========================================================================

    /// Midpoint circle outline. Radius 0 draws nothing.
    pub fn draw_circle(&mut self, x: i32, y: i32, radius: i32, color: Color) {
        if radius == 0 {
            return;
        }
        let mut x0 = 0;
        let mut y0 = radius;
        let mut d = 3 - 2 * radius;

        // One octant, mirrored eight ways
        while y0 >= x0 {
            self.set_pixel(x + x0, y - y0, color);
            self.set_pixel(x + y0, y - x0, color);
            self.set_pixel(x + y0, y + x0, color);
            self.set_pixel(x + x0, y + y0, color);
            self.set_pixel(x - x0, y + y0, color);
            self.set_pixel(x - y0, y + x0, color);
            self.set_pixel(x - y0, y - x0, color);
            self.set_pixel(x - x0, y - y0, color);

            if d < 0 {
                d += 4 * x0 + 6;
            } else {
                d += 4 * (x0 - y0) + 10;
                y0 -= 1;
            }
            x0 += 1;
        }
    }

    /// Midpoint circle filled with horizontal spans. Radius 0 draws nothing.
    pub fn fill_circle(&mut self, x: i32, y: i32, radius: i32, color: Color) {
        if radius == 0 {
            return;
        }
        let mut x0 = 0;
        let mut y0 = radius;
        let mut d = 3 - 2 * radius;

        while y0 >= x0 {
            self.span(x - x0, x + x0, y - y0, color);
            self.span(x - y0, x + y0, y - x0, color);
            self.span(x - x0, x + x0, y + y0, color);
            self.span(x - y0, x + y0, y + x0, color);

            if d < 0 {
                d += 4 * x0 + 6;
            } else {
                d += 4 * (x0 - y0) + 10;
                y0 -= 1;
            }
            x0 += 1;
        }
    }

    // ========================================================================
    // Triangles and polygons
    // ========================================================================

    pub fn draw_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: Color,
    ) {
        self.draw_line(x1, y1, x2, y2, color);
        self.draw_line(x2, y2, x3, y3, color);
        self.draw_line(x3, y3, x1, y1, color);
    }

    /// Half-open span `[ax, bx)` (endpoints in either order) for triangle fill
    fn triangle_span(&mut self, ax: i32, bx: i32, y: i32, color: Color) {
        let (ax, bx) = if ax > bx { (bx, ax) } else { (ax, bx) };
        if bx > ax {
            self.span(ax, bx - 1, y, color);
        }
    }

    /// Scanline triangle fill.
    ///
    /// Vertices are sorted by y. The upper half walks the top->middle edge
    /// against the long top->bottom edge, the lower half walks the
    /// middle->bottom edge against the same long edge. The middle row is
    /// covered by both halves. Flat halves are skipped.
    pub fn fill_triangle(
        &mut self,
        mut x1: i32,
        mut y1: i32,
        mut x2: i32,
        mut y2: i32,
        mut x3: i32,
        mut y3: i32,
        color: Color,
    ) {
        if y2 < y1 {
            std::mem::swap(&mut y1, &mut y2);
            std::mem::swap(&mut x1, &mut x2);
        }
        if y3 < y1 {
            std::mem::swap(&mut y1, &mut y3);
            std::mem::swap(&mut x1, &mut x3);
        }
        if y3 < y2 {
            std::mem::swap(&mut y2, &mut y3);
            std::mem::swap(&mut x2, &mut x3);
        }

        let long_dy = y3 - y1;
        let long_step = if long_dy != 0 {
            (x3 - x1) as f32 / long_dy as f32
        } else {
            0.0
        };
        let long_x = |i: i32| (x1 as f32 + (i - y1) as f32 * long_step) as i32;

        let upper_dy = y2 - y1;
        if upper_dy != 0 {
            let step = (x2 - x1) as f32 / upper_dy as f32;
            for i in y1..=y2 {
                let ax = (x1 as f32 + (i - y1) as f32 * step) as i32;
                self.triangle_span(ax, long_x(i), i, color);
            }
        }

        let lower_dy = y3 - y2;
        if lower_dy != 0 {
            let step = (x3 - x2) as f32 / lower_dy as f32;
            for i in y2..=y3 {
                let ax = (x2 as f32 + (i - y2) as f32 * step) as i32;
                self.triangle_span(ax, long_x(i), i, color);
            }
        }
    }

    /// Closed polyline through `points`. An empty slice draws nothing, a
    /// single point draws that pixel.
    pub fn draw_polygon(&mut self, points: &[(i32, i32)], color: Color) {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return;
        };
        for pair in points.windows(2) {
            let ((xa, ya), (xb, yb)) = (pair[0], pair[1]);
            self.draw_line(xa, ya, xb, yb, color);
        }
        self.draw_line(last.0, last.1, first.0, first.1, color);
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Blit a bitmap with its top-left corner at (x, y).
    ///
    /// Translucent bitmaps are queued with the current depth and drawn by
    /// `process`.
    pub fn draw_image(&mut self, bitmap: &Bitmap, x: i32, y: i32) {
        self.draw_image_with(bitmap, x, y, None);
    }

    /// Like `draw_image`, but source pixels equal to `from` are drawn as `to`
    pub fn draw_image_recolored(
        &mut self,
        bitmap: &Bitmap,
        x: i32,
        y: i32,
        from: Color,
        to: Color,
    ) {
        self.draw_image_with(bitmap, x, y, Some((from, to)));
    }

    /// Draw one tile of a sprite sheet, with the same queueing as `draw_image`
    pub fn draw_image_tile(
        &mut self,
        sheet: &TiledBitmap,
        x: i32,
        y: i32,
        tile_x: u32,
        tile_y: u32,
    ) {
        let tile = sheet.tile(tile_x, tile_y);
        self.draw_image_with(&tile, x, y, None);
    }

    fn draw_image_with(
        &mut self,
        bitmap: &Bitmap,
        x: i32,
        y: i32,
        recolor: Option<(Color, Color)>,
    ) {
        if bitmap.is_translucent() && !self.processing {
            self.pending.push(DrawRequest {
                bitmap: bitmap.clone(),
                depth: self.current_depth,
                x,
                y,
                recolor,
            });
            return;
        }

        let w = bitmap.width() as i32;
        let Some(c) = self.clip(x, y, w, bitmap.height() as i32) else {
            return;
        };
        let src = bitmap.pixels();
        for ly in c.y0..c.y1 {
            for lx in c.x0..c.x1 {
                let mut p = src[(lx + ly * w) as usize];
                if let Some((from, to)) = recolor {
                    if p == from {
                        p = to;
                    }
                }
                self.set_pixel(x + lx, y + ly, p);
            }
        }
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Stencil a glyph: only pixels equal to the ink color are drawn, in
    /// `color`. Glyphs are never queued.
    pub fn draw_character(&mut self, glyph: &Bitmap, x: i32, y: i32, color: Color) {
        let w = glyph.width() as i32;
        let Some(c) = self.clip(x, y, w, glyph.height() as i32) else {
            return;
        };
        let src = glyph.pixels();
        for ly in c.y0..c.y1 {
            for lx in c.x0..c.x1 {
                if src[(lx + ly * w) as usize] == GLYPH_INK {
                    self.set_pixel(x + lx, y + ly, color);
                }
            }
        }
    }

    /// Draw a single line of text, advancing by each glyph's width
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Color, font: &Font) {
        let mut cursor = x;
        for ch in text.chars() {
            let code = ch as u32;
            self.draw_character(&font.glyph(code), cursor, y, color);
            cursor += font.width(code) as i32;
        }
    }
}
