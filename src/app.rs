//! Game loop pieces that do not need a window
//!
//! The window loop in the binary glues these together: a [`FixedTimestep`]
//! decides how many `update` calls run, [`render_frame`] produces the
//! frame, and an [`FpsCounter`] reports the rate.

use std::collections::VecDeque;
use std::time::Instant;

use crate::color::Color;
use crate::rasterizer::Rasterizer;

/// Update rate of the game loop, in seconds per step
pub const UPDATE_STEP: f64 = 1.0 / 60.0;

/// A game driven by the loop
pub trait Game {
    /// Advance the simulation by `dt` seconds
    fn update(&mut self, dt: f32);

    /// Issue draw calls for the current frame
    fn render(&mut self, r: &mut Rasterizer);
}

/// Produce one frame: clear, let the game draw, then composite and light
pub fn render_frame(r: &mut Rasterizer, game: &mut dyn Game, clear_color: Color) {
    r.clear(clear_color);
    game.render(r);
    r.process();
}

// ============================================================================
// Fixed timestep
// ============================================================================

/// Accumulates wall time and hands it out in fixed steps
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f64,
    unprocessed: f64,
}

impl FixedTimestep {
    pub fn new(step: f64) -> Self {
        Self {
            step,
            unprocessed: 0.0,
        }
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Time carried over to the next call
    #[inline]
    pub fn unprocessed(&self) -> f64 {
        self.unprocessed
    }

    /// Add `passed` seconds and return how many whole steps are now due
    pub fn advance(&mut self, passed: f64) -> u32 {
        if self.step <= 0.0 {
            return 0;
        }
        self.unprocessed += passed;
        let mut steps = 0;
        while self.unprocessed >= self.step {
            self.unprocessed -= self.step;
            steps += 1;
        }
        steps
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(UPDATE_STEP)
    }
}

// ============================================================================
// FPS Counter
// ============================================================================

/// Frames-per-second counter.
///
/// Counts frames over whole seconds and keeps a rolling window of frame
/// times for a smoothed average.
pub struct FpsCounter {
    frame_times: VecDeque<f32>,
    sample_count: usize,
    last_frame: Instant,
    elapsed: f32,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    /// Create a counter averaging over `sample_count` frames
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            sample_count: sample_count.max(1),
            last_frame: Instant::now(),
            elapsed: 0.0,
            frames: 0,
            fps: 0,
        }
    }

    /// Record a frame ending now.
    /// Returns the frame count of the second that just completed, if any.
    pub fn tick(&mut self) -> Option<u32> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt)
    }

    /// Record a frame that took `dt` seconds
    pub fn record(&mut self, dt: f32) -> Option<u32> {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }

        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= 1.0 {
            self.fps = self.frames;
            self.frames = 0;
            self.elapsed = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    /// Frames counted in the last completed second
    #[inline]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Average FPS over the sample window
    pub fn average_fps(&self) -> f32 {
        let avg_dt = self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::color::{BLACK, BLUE, RED};

    struct Blobs {
        updates: u32,
    }

    impl Game for Blobs {
        fn update(&mut self, _dt: f32) {
            self.updates += 1;
        }

        fn render(&mut self, r: &mut Rasterizer) {
            r.fill_rectangle(0, 0, 2, 2, RED);
            r.set_depth(1);
            r.draw_image(&Bitmap::solid(1, 1, BLUE).with_translucency(true), 1, 1);
            r.set_depth(0);
        }
    }

    #[test]
    fn test_render_frame_flushes_queue() {
        let mut r = Rasterizer::new(3, 3);
        let mut game = Blobs { updates: 0 };
        render_frame(&mut r, &mut game, BLACK);

        assert_eq!(r.pending_len(), 0);
        assert_eq!(r.pixel(0, 0), Some(RED));
        assert_eq!(r.pixel(1, 1), Some(BLUE));
        assert_eq!(r.pixel(2, 2), Some(BLACK));
    }

    #[test]
    fn test_render_frame_clears_previous_frame() {
        let mut r = Rasterizer::new(3, 3);
        r.fill_rectangle(0, 0, 3, 3, BLUE);
        struct Nothing;
        impl Game for Nothing {
            fn update(&mut self, _dt: f32) {}
            fn render(&mut self, _r: &mut Rasterizer) {}
        }
        render_frame(&mut r, &mut Nothing, BLACK);
        assert!(r.pixels().iter().all(|&p| p == BLACK));
    }

    #[test]
    fn test_fixed_timestep_counts_whole_steps() {
        let mut clock = FixedTimestep::new(0.5);
        assert_eq!(clock.advance(1.25), 2);
        assert_eq!(clock.unprocessed(), 0.25);
        assert_eq!(clock.advance(0.25), 1);
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_fixed_timestep_drives_updates() {
        let mut clock = FixedTimestep::new(0.25);
        let mut game = Blobs { updates: 0 };
        for _ in 0..clock.advance(1.0) {
            game.update(clock.step() as f32);
        }
        assert_eq!(game.updates, 4);
    }

    #[test]
    fn test_zero_step_never_fires() {
        let mut clock = FixedTimestep::new(0.0);
        assert_eq!(clock.advance(10.0), 0);
    }

    #[test]
    fn test_fps_reported_once_per_second() {
        let mut fps = FpsCounter::new(8);
        assert_eq!(fps.record(0.25), None);
        assert_eq!(fps.record(0.25), None);
        assert_eq!(fps.record(0.25), None);
        assert_eq!(fps.record(0.25), Some(4));
        assert_eq!(fps.fps(), 4);
        assert_eq!(fps.average_fps(), 4.0);
        assert_eq!(fps.record(0.25), None);
    }

    #[test]
    fn test_fps_window_is_bounded() {
        let mut fps = FpsCounter::new(2);
        fps.record(1.0);
        fps.record(0.5);
        fps.record(0.5);
        assert_eq!(fps.average_fps(), 2.0);
    }
}
