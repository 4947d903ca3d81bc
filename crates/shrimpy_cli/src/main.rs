//! Shrimpy CLI - progressive path tracing of JSON scene files.
//!
//! Renders a fixed number of frames headlessly, accumulating one sample per
//! pixel per frame, and writes the resolved image as PNG.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use shrimpy_core::{FrameUniforms, SceneDescription};
use shrimpy_renderer::{render_frame, AccumulationBuffer, DisplayImage, RenderConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "shrimpy")]
#[command(about = "Progressive Monte Carlo path tracer", long_about = None)]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Number of progressive frames (samples per pixel)
    #[arg(short, long, default_value_t = 64)]
    frames: u32,

    /// Override the image width from the scene file
    #[arg(long)]
    width: Option<u32>,

    /// Override the image height from the scene file
    #[arg(long)]
    height: Option<u32>,

    /// Output image (PNG)
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Simulated time between frames, used to decorrelate seeds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    seconds_per_frame: f32,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    threads: Option<usize>,
}

/// A scene description plus optional renderer settings.
#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(flatten)]
    scene: SceneDescription,
    #[serde(default)]
    render: RenderConfig,
}

impl SceneFile {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        let file: SceneFile = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scene file {}", path.display()))?;

        Ok(SceneFile {
            scene: file.scene.located_at(path),
            render: file.render,
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let file = SceneFile::load(&args.scene)?;
    let image = render(&args, &file)?;
    save_png(&image, &args.output)?;

    log::info!("Saved {}", args.output.display());
    Ok(())
}

/// Run the progressive loop and return the final resolved image.
fn render(args: &Args, file: &SceneFile) -> Result<DisplayImage> {
    let start = Instant::now();
    let scene = file
        .scene
        .build_scene()
        .with_context(|| format!("Failed to build scene {}", args.scene.display()))?;
    log::info!("Scene built in {:?}", start.elapsed());

    let width = args.width.unwrap_or(file.scene.width);
    let height = args.height.unwrap_or(file.scene.height);
    anyhow::ensure!(width > 0 && height > 0, "Image size must be non-zero, got {width}x{height}");

    let mut uniforms = FrameUniforms::new(file.scene.camera(), width, height).with_gamma(file.scene.gamma);
    let mut previous = AccumulationBuffer::new(width, height);
    let mut current = AccumulationBuffer::new(width, height);
    let mut image = DisplayImage::new(width, height);

    log::info!(
        "Rendering {}x{} for {} frames ({} max bounces)",
        width,
        height,
        args.frames,
        uniforms.camera.max_ray_bounces
    );

    let start = Instant::now();
    let report_every = (args.frames / 10).max(1);
    for frame in 0..args.frames {
        uniforms.advance(frame as f32 * args.seconds_per_frame);
        image = render_frame(&scene, &uniforms, &file.render, &previous, &mut current);
        std::mem::swap(&mut previous, &mut current);

        if (frame + 1) % report_every == 0 || frame + 1 == args.frames {
            log::info!("Frame {}/{} ({:?})", frame + 1, args.frames, start.elapsed());
        }
    }

    Ok(image)
}

fn save_png(image: &DisplayImage, path: &Path) -> Result<()> {
    let buffer = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("Image buffer does not match its dimensions")?;
    buffer
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
