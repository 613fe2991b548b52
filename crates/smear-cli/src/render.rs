//! `smear render`: moves a sprite around a circle, one ring layer per frame,
//! and saves every composited frame as a PNG.

use std::f64::consts::TAU;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use smear_core::hash::hash_frame;
use smear_core::{AlphaScalingMode, Color, Extent, FrameBuffer, TrailConfig};
use smear_render::export::{load_image, save_png};
use smear_render::{CpuBackend, Surface, TrailCompositor};

/// Capacity used when neither `--config` nor `--capacity` is given.
const DEFAULT_CAPACITY: usize = 12;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Number of frames to render
    #[arg(short = 'n', long, default_value_t = 60)]
    frames: u32,

    /// Directory for frame_NNNN.png files
    #[arg(short, long, default_value = "output")]
    out: PathBuf,

    /// trail.toml to start from; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of history layers in the ring
    #[arg(long)]
    capacity: Option<usize>,

    /// How many recent layers are composited
    #[arg(long)]
    visible: Option<usize>,

    /// Fade curve: none, linear or log
    #[arg(long)]
    mode: Option<AlphaScalingMode>,

    /// Base of the log fade curve (must be > 1)
    #[arg(long)]
    log_base: Option<f64>,

    /// Surface size as WIDTHxHEIGHT
    #[arg(long)]
    size: Option<Extent>,

    /// Image to move around instead of a solid square
    #[arg(long)]
    sprite: Option<PathBuf>,

    /// Square color as #RRGGBB
    #[arg(long, default_value = "#33AAFF")]
    color: String,

    /// Background color as #RRGGBB
    #[arg(long, default_value = "#000000")]
    background: String,
}

impl RenderArgs {
    /// File settings (or defaults) with command-line overrides applied.
    fn trail_config(&self) -> Result<TrailConfig> {
        let mut config = match &self.config {
            Some(path) => TrailConfig::load_from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => {
                let mut config = TrailConfig::with_capacity(DEFAULT_CAPACITY);
                config.dimensions = Extent::new(320, 240);
                config
            }
        };

        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(visible) = self.visible {
            config.visible_layers = visible;
        }
        if let Some(mode) = self.mode {
            config.alpha_scaling = mode;
        }
        if let Some(log_base) = self.log_base {
            config.log_base = log_base;
        }
        if let Some(size) = self.size {
            config.dimensions = size;
        }
        Ok(config)
    }
}

/// What gets drawn into the active layer each frame.
enum Sprite {
    Image(FrameBuffer),
    Square { side: u32, color: Color },
}

impl Sprite {
    fn size(&self) -> (u32, u32) {
        match self {
            Sprite::Image(fb) => (fb.width, fb.height),
            Sprite::Square { side, .. } => (*side, *side),
        }
    }

    fn draw(&self, frame: &mut FrameBuffer, x: i32, y: i32) {
        match self {
            Sprite::Image(fb) => frame.composite_over(fb, x, y),
            Sprite::Square { side, color } => frame.fill_rect(x, y, *side, *side, color),
        }
    }
}

pub fn run(args: RenderArgs) -> Result<()> {
    let start = Instant::now();
    let config = args.trail_config()?;
    let background = parse_color(&args.background)?;
    let sprite = match &args.sprite {
        Some(path) => Sprite::Image(load_image(path)?),
        None => Sprite::Square {
            side: (config.dimensions.width.min(config.dimensions.height) / 6).max(1),
            color: parse_color(&args.color)?,
        },
    };

    let mut trail = TrailCompositor::from_config(CpuBackend::new(), &config)
        .context("failed to set up the trail compositor")?;
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;

    tracing::info!(
        "Rendering {} frames at {} ({} of {} layers, {} fade)",
        args.frames,
        config.dimensions,
        trail.visible_layers(),
        trail.capacity(),
        trail.alpha_scaling_mode()
    );

    let Extent { width, height } = config.dimensions;
    let (sprite_w, sprite_h) = sprite.size();
    let radius = width.min(height) as f64 / 3.0;
    let mut canvas = FrameBuffer::solid(width, height, &background);

    for index in 0..args.frames {
        let angle = TAU * index as f64 / args.frames.max(1) as f64;
        let x = (width as f64 / 2.0 + radius * angle.cos() - sprite_w as f64 / 2.0).round() as i32;
        let y = (height as f64 / 2.0 + radius * angle.sin() - sprite_h as f64 / 2.0).round() as i32;

        trail.advance();
        let layer = trail.active_layer_mut();
        layer.clear(Color::TRANSPARENT);
        sprite.draw(layer.frame_mut(), x, y);

        canvas.clear(&background);
        trail.composite(&mut canvas);

        let path = args.out.join(format!("frame_{:04}.png", index));
        save_png(&canvas, &path)?;
        tracing::debug!("Wrote {}", path.display());
    }

    tracing::info!(
        "Rendered {} frames into {} in {:.2?} (last frame {})",
        args.frames,
        args.out.display(),
        start.elapsed(),
        hash_frame(&canvas)
    );
    Ok(())
}

fn parse_color(hex: &str) -> Result<Color> {
    Color::from_hex(hex).with_context(|| format!("invalid color '{}'", hex))
}
