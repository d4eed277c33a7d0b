//! SDL2 window that shows the rasterizer's color buffer

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::config::Config;
use crate::rasterizer::Rasterizer;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

/// Streaming texture the color buffer is uploaded into
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    KeyUp(Keycode),
}

impl Display {
    /// Create a display sized and titled from a config
    pub fn from_config(config: &Config) -> Result<(Self, TextureCreator<WindowContext>), String> {
        Self::with_options(
            &config.title,
            config.width,
            config.height,
            config.scale,
            config.vsync,
        )
    }

    /// Create a window of `width * scale` by `height * scale`.
    /// vsync=false leaves frame pacing to the caller.
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        scale: f32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let window_width = ((width as f32 * scale) as u32).max(1);
        let window_height = ((height as f32 * scale) as u32).max(1);

        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, window_width, window_height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        log::info!(
            "Window {}x{} showing a {}x{} buffer (vsync: {})",
            window_width,
            window_height,
            width,
            height,
            vsync
        );

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.canvas.window_mut().set_title(title) {
            log::warn!("Could not set window title: {}", e);
        }
    }

    /// Upload the color buffer and show it, stretched to the window
    pub fn present(&mut self, target: &mut RenderTarget, raster: &Rasterizer) -> Result<(), String> {
        if raster.width() != target.width || raster.height() != target.height {
            return Err(format!(
                "Buffer is {}x{} but the render target is {}x{}",
                raster.width(),
                raster.height(),
                target.width,
                target.height
            ));
        }

        target
            .texture
            .update(None, raster.as_bytes(), (raster.width() * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::KeyUp {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyUp(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create a render target matching the rasterizer's resolution.
    ///
    /// `RGB888` reads the native-endian `0x00RRGGBB` word and ignores the
    /// alpha byte.
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }
}
