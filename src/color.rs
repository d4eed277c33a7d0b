//! Packed ARGB colors
//!
//! Colors are plain `u32` values laid out as `0xAARRGGBB`. Alpha 0 is
//! skipped by the rasterizer, 255 is written directly and anything in
//! between is blended.

/// A packed `0xAARRGGBB` color
pub type Color = u32;

pub const TRANSPARENT: Color = 0x0000_0000;
pub const BLACK: Color = 0xFF00_0000;
pub const WHITE: Color = 0xFFFF_FFFF;
pub const RED: Color = 0xFFFF_0000;
pub const GREEN: Color = 0xFF00_FF00;
pub const BLUE: Color = 0xFF00_00FF;
pub const YELLOW: Color = 0xFFFF_FF00;
pub const CYAN: Color = 0xFF00_FFFF;
pub const MAGENTA: Color = 0xFFFF_00FF;
pub const GREY: Color = 0xFF80_8080;

// ============================================================================
// Channel access
// ============================================================================

#[inline]
pub const fn alpha(c: Color) -> u8 {
    (c >> 24) as u8
}

#[inline]
pub const fn red(c: Color) -> u8 {
    (c >> 16) as u8
}

#[inline]
pub const fn green(c: Color) -> u8 {
    (c >> 8) as u8
}

#[inline]
pub const fn blue(c: Color) -> u8 {
    c as u8
}

/// Pack four channels into a color
#[inline]
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Color {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Pack an opaque color
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
    argb(255, r, g, b)
}

/// Replace the alpha byte of a color
#[inline]
pub const fn with_alpha(c: Color, a: u8) -> Color {
    (c & 0x00FF_FFFF) | (a as u32) << 24
}

// ============================================================================
// Compositing
// ============================================================================

/// Move one channel from `dst` toward `src` by `t` (0.0..=1.0), truncating
#[inline]
fn blend_channel(dst: u8, src: u8, t: f32) -> u8 {
    let d = dst as i32;
    let s = src as i32;
    (d - ((d - s) as f32 * t) as i32) as u8
}

/// Blend `src` over `dst` using the alpha byte of `src`.
/// The alpha byte of `dst` is kept.
#[inline]
pub fn blend(dst: Color, src: Color) -> Color {
    let t = alpha(src) as f32 / 255.0;
    argb(
        alpha(dst),
        blend_channel(red(dst), red(src), t),
        blend_channel(green(dst), green(src), t),
        blend_channel(blue(dst), blue(src), t),
    )
}

/// Per-channel maximum of two colors
#[inline]
pub fn max_channels(a: Color, b: Color) -> Color {
    argb(
        alpha(a).max(alpha(b)),
        red(a).max(red(b)),
        green(a).max(green(b)),
        blue(a).max(blue(b)),
    )
}

/// Scale each RGB channel of `c` by the matching channel of `light` / 255.
/// The alpha byte of `c` is kept.
#[inline]
pub fn modulate(c: Color, light: Color) -> Color {
    let scale = |ch: u8, l: u8| (ch as f32 * (l as f32 / 255.0)) as u8;
    argb(
        alpha(c),
        scale(red(c), red(light)),
        scale(green(c), green(light)),
        scale(blue(c), blue(light)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_roundtrip_literal() {
        let c = 0x80_12_34_56;
        assert_eq!(alpha(c), 0x80);
        assert_eq!(red(c), 0x12);
        assert_eq!(green(c), 0x34);
        assert_eq!(blue(c), 0x56);
        assert_eq!(argb(0x80, 0x12, 0x34, 0x56), c);
    }

    #[test]
    fn test_blend_half_alpha() {
        // 50% of the way from 0 to 200, truncated
        let out = blend(BLACK, argb(128, 200, 0, 100));
        assert_eq!(alpha(out), 255);
        assert_eq!(red(out), 100);
        assert_eq!(green(out), 0);
        assert_eq!(blue(out), 50);
    }

    #[test]
    fn test_blend_toward_darker_color() {
        let out = blend(WHITE, argb(51, 0, 0, 0));
        // 255 - trunc(255 * 0.2) = 204
        assert_eq!(red(out), 204);
        assert_eq!(green(out), 204);
        assert_eq!(blue(out), 204);
    }

    #[test]
    fn test_max_channels() {
        assert_eq!(max_channels(0xFF_10_80_20, 0x00_40_20_30), 0xFF_40_80_30);
    }

    #[test]
    fn test_modulate_full_light_is_identity() {
        let c = rgb(12, 200, 99);
        assert_eq!(modulate(c, WHITE), c);
    }

    #[test]
    fn test_modulate_no_light_is_black() {
        assert_eq!(modulate(rgb(12, 200, 99), BLACK), BLACK);
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(with_alpha(RED, 0x40), 0x40FF_0000);
    }
}
