use log::warn;
use sdl2::keyboard::Keycode;

use paintbox::util::FpsCounter;
use paintbox::{
    draw_text, Color, Display, FontCache, GraphicsError, InputEvent, PixelBuffer, Point,
    RenderTarget, ScreenConfig, Texture, TtfGlyphSource,
};

const CONFIG_PATH: &str = "screen.json";
const FONT_NAME: &str = "Atkinson";

/// Apply command line overrides to the loaded configuration
fn parse_args(config: &mut ScreenConfig) {
    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => config.vsync = false,
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        config.width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        config.height = h;
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // Parse WxH format (e.g., 1024x768)
                    let parts: Vec<&str> = args[i + 1].split('x').collect();
                    if parts.len() == 2 {
                        if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                            config.width = w;
                            config.height = h;
                        }
                    }
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: paintbox [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --width W, -w W           Set window width");
                println!("  --height H, -h H          Set window height");
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1024x768)");
                println!("  --no-vsync                Disable VSync for uncapped framerate");
                println!("  --help                    Show this help message");
                println!();
                println!("Settings are read from {} when present.", CONFIG_PATH);
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }
}

fn main() -> Result<(), GraphicsError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = ScreenConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!("{} ({}), using defaults", e, CONFIG_PATH);
        ScreenConfig::default()
    });
    parse_args(&mut config);

    let (mut display, texture_creator) =
        Display::with_options(&config.title, config.width, config.height, config.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, config.width, config.height)?;
    let mut buffer = PixelBuffer::open(config.width, config.height)?;

    let ttf = sdl2::ttf::init().map_err(|e| GraphicsError::Font(e.to_string()))?;
    let mut fonts = FontCache::new(TtfGlyphSource::new(&ttf, "fonts"));
    // Flipped off after the first failure so a missing font file does not
    // spam the log every frame.
    let mut text_enabled = true;

    let sample = match Texture::load("sample.png") {
        Ok(tex) => Some(tex),
        Err(e) => {
            warn!("{}, skipping image demo", e);
            None
        },
    };

    let mut fps_counter = FpsCounter::new(60);
    let mut t: f32 = 0.0;

    println!("=== paintbox ===");
    println!("Resolution: {}x{}", config.width, config.height);
    println!("Escape to quit. Use --help for command line options.");

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick();
        t += dt;

        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                _ => {},
            }
        }

        let w = buffer.width() as f32;
        let h = buffer.height() as f32;
        buffer.clear(Color::new(12, 12, 24));

        // Backdrop panel; corners given in "wrong" order on purpose.
        buffer.fill_rect(
            Point::new(w * 0.9, h * 0.1),
            Point::new(w * 0.1, h * 0.9),
            Color::new(24, 32, 48),
        );

        // Fan of lines from the center, long enough to cross every edge so
        // the clipper earns its keep.
        let (cx, cy) = (w / 2.0, h / 2.0);
        let reach = w.max(h);
        for i in 0..24 {
            let phase = t * 0.8 + i as f32 * (std::f32::consts::TAU / 24.0);
            let end = Point::new(cx + phase.cos() * reach, cy + phase.sin() * reach);
            let shade = (i * 10) as u8;
            buffer.line(
                Point::new(cx, cy),
                end,
                Color::new(255 - shade, 128, 55 + shade),
            );
        }

        // Drift the sample image through the top-left corner so part of it
        // hangs off screen.
        if let Some(pic) = &sample {
            let ox = ((t * 0.7).sin() * 120.0) as i32 - 40;
            let oy = ((t * 0.9).cos() * 120.0) as i32 - 40;
            buffer.blit((ox, oy), pic);
        }

        if text_enabled {
            let label = format!("{:.0} fps", avg_fps);
            if let Err(e) = draw_text(
                &mut buffer,
                &mut fonts,
                (8, 8),
                Color::WHITE,
                &label,
                FONT_NAME,
                16,
            ) {
                warn!("{}, text disabled", e);
                text_enabled = false;
            }
        }

        display.present(&mut target, &buffer)?;
    }

    Ok(())
}
