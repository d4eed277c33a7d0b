//! softraster: a CPU 2D rasterizer for small games
//!
//! Draw calls write packed ARGB pixels into a [`Rasterizer`]'s color buffer
//! with a per-pixel depth test. Translucent images are queued and composited
//! back to front when the frame is processed, after which a light buffer is
//! multiplied in. The finished buffer is handed to a display, such as the
//! SDL2 window behind the `window` feature.

pub mod app;
pub mod bitmap;
pub mod color;
pub mod config;
pub mod error;
pub mod font;
pub mod queue;
pub mod rasterizer;
pub mod tiled;

#[cfg(feature = "window")]
pub mod display;

pub use bitmap::Bitmap;
pub use color::Color;
pub use config::Config;
pub use error::{Error, Result};
pub use font::Font;
pub use rasterizer::Rasterizer;
pub use tiled::TiledBitmap;
