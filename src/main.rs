use std::path::PathBuf;
use std::time::{Duration, Instant};

use sdl2::keyboard::Keycode;
use softraster::app::{render_frame, FixedTimestep, FpsCounter, Game};
use softraster::color::{self, Color};
use softraster::display::{Display, InputEvent, RenderTarget};
use softraster::{Bitmap, Config, Font, Rasterizer};

/// Command line overrides applied on top of the config file
#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    scale: Option<f32>,
    no_vsync: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => parsed.no_vsync = true,
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        parsed.width = Some(w);
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        parsed.height = Some(h);
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // WxH, e.g. 320x240
                    if let Some((w, h)) = args[i + 1].split_once('x') {
                        if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                            parsed.width = Some(w);
                            parsed.height = Some(h);
                        }
                    }
                    i += 1;
                }
            },
            "--scale" | "-s" => {
                if i + 1 < args.len() {
                    if let Ok(s) = args[i + 1].parse::<f32>() {
                        parsed.scale = Some(s);
                    }
                    i += 1;
                }
            },
            "--help" => {
                let defaults = Config::default();
                println!("Usage: softraster [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --config PATH, -c PATH    Load settings from a JSON file");
                println!(
                    "  --width W, -w W           Set buffer width (default: {})",
                    defaults.width
                );
                println!(
                    "  --height H, -h H          Set buffer height (default: {})",
                    defaults.height
                );
                println!("  --resolution WxH, -r WxH  Set buffer size (e.g., 320x240)");
                println!("  --scale S, -s S           Window size multiplier (default: 1.0)");
                println!("  --no-vsync                Disable VSync");
                println!("  --help                    Show this help message");
                std::process::exit(0);
            },
            other => log::warn!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }

    parsed
}

// ============================================================================
// Demo game
// ============================================================================

/// Orbiting shapes over a dim ambient, with a light following the orbit
struct Demo {
    time: f32,
    glass: Bitmap,
    font: Option<Font>,
    show_info: bool,
    fps: u32,
}

impl Demo {
    fn new(font: Option<Font>) -> Self {
        Self {
            time: 0.0,
            glass: Bitmap::solid(48, 48, color::with_alpha(color::CYAN, 0x80))
                .with_translucency(true),
            font,
            show_info: false,
            fps: 0,
        }
    }

    fn light(r: &mut Rasterizer, cx: i32, cy: i32, radius: i32, tint: Color) {
        for y in -radius..=radius {
            for x in -radius..=radius {
                let dist = ((x * x + y * y) as f32).sqrt() / radius as f32;
                if dist <= 1.0 {
                    let k = 1.0 - dist;
                    let ch = |c: u8| (c as f32 * k) as u8;
                    let c = color::rgb(ch(color::red(tint)), ch(color::green(tint)), ch(color::blue(tint)));
                    r.set_light_map(cx + x, cy + y, c);
                }
            }
        }
    }
}

impl Game for Demo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, r: &mut Rasterizer) {
        let w = r.width() as i32;
        let h = r.height() as i32;
        let cx = w / 2;
        let cy = h / 2;
        let orbit = (w.min(h) / 3) as f32;
        let ox = cx + (self.time.cos() * orbit) as i32;
        let oy = cy + (self.time.sin() * orbit) as i32;

        r.set_depth(0);
        r.fill_rect(0, 0, w, h, color::rgb(40, 40, 60));
        r.draw_rect(8, 8, w - 17, h - 17, color::GREY);

        r.set_depth(1);
        r.fill_triangle(cx, cy - 80, cx - 70, cy + 50, cx + 70, cy + 50, color::YELLOW);
        r.draw_polygon(
            &[(cx - 120, cy), (cx, cy - 120), (cx + 120, cy), (cx, cy + 120)],
            color::MAGENTA,
        );

        r.set_depth(2);
        r.fill_circle(ox, oy, 24, color::RED);
        r.draw_circle(ox, oy, 30, color::WHITE);
        r.draw_line(cx, cy, ox, oy, color::GREEN);

        r.set_depth(3);
        r.draw_image(&self.glass, ox - 10, oy - 10);

        Self::light(r, ox, oy, 160, color::WHITE);

        if self.show_info {
            if let Some(font) = &self.font {
                r.set_depth(10);
                r.draw_text(&format!("FPS:{}", self.fps), 12, 12, color::WHITE, font);
            }
        }
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let mut config = match &args.config {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if let Some(s) = args.scale {
        config.scale = s;
    }
    if args.no_vsync {
        config.vsync = false;
    }

    let (mut display, texture_creator) = Display::from_config(&config)?;
    let mut target = RenderTarget::with_size(&texture_creator, config.width, config.height)?;

    let mut raster = Rasterizer::new(config.width, config.height);
    raster.set_ambient_color(config.ambient_color);

    let font = config.font.as_ref().map(Font::open);
    let mut game = Demo::new(font);

    log::info!("Buffer {}x{} (scale {})", config.width, config.height, config.scale);
    log::info!("Controls: Ctrl toggles the FPS overlay, Escape quits");

    let mut clock = FixedTimestep::default();
    let mut fps_counter = FpsCounter::new(60);
    let mut last_time = Instant::now();

    'main: loop {
        let now = Instant::now();
        let passed = (now - last_time).as_secs_f64();
        last_time = now;

        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyUp(Keycode::LCtrl | Keycode::RCtrl) => {
                    game.show_info = !game.show_info;
                },
                _ => {},
            }
        }

        let steps = clock.advance(passed);
        for _ in 0..steps {
            game.update(clock.step() as f32);
        }

        if steps > 0 || !config.capped {
            render_frame(&mut raster, &mut game, config.clear_color);
            display.present(&mut target, &raster)?;

            if let Some(fps) = fps_counter.tick() {
                game.fps = fps;
                if config.show_fps {
                    log::info!("FPS: {}", fps);
                }
                display.set_title(&format!(
                    "{} - fps: {} {}x{}",
                    config.title, fps, config.width, config.height
                ));
            }
        } else {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    Ok(())
}
