//! Progressive frame rendering.
//!
//! One pixel invocation traces a single path and folds it into a running
//! sum. Frames are double-buffered: every invocation reads the previous
//! [`AccumulationBuffer`] and writes only its own pixel of the current one,
//! so rows can be rendered in parallel without synchronization. Swapping
//! the two buffers between frames is up to the caller.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shrimpy_core::{FrameUniforms, Scene};
use shrimpy_math::{Ray, UVec2, Vec3};

use crate::camera::{generate_ray, Bokeh};
use crate::integrator::trace_path;
use crate::query::{SceneQuery, DEFAULT_BVH_THRESHOLD};
use crate::sampler::Sampler;

/// Background seen by rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Sky {
    /// Vertical blend from `horizon` (straight down) to `zenith` (straight up)
    Gradient { horizon: Vec3, zenith: Vec3 },
    /// Uniform color in every direction
    Constant { color: Vec3 },
    /// No environment light
    Black,
}

impl Sky {
    /// Radiance arriving from the sky along `ray`.
    pub fn color(&self, ray: &Ray) -> Vec3 {
        match *self {
            Sky::Gradient { horizon, zenith } => {
                let unit_direction = ray.direction.normalize_or_zero();
                let a = 0.5 * (unit_direction.y + 1.0);
                horizon * (1.0 - a) + zenith * a
            }
            Sky::Constant { color } => color,
            Sky::Black => Vec3::ZERO,
        }
    }
}

impl Default for Sky {
    fn default() -> Self {
        Sky::Gradient {
            horizon: Vec3::ONE,
            zenith: Vec3::new(0.5, 0.7, 1.0),
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Environment seen by escaping rays
    pub sky: Sky,
    /// Triangle count at which queries switch from linear search to the BVH
    pub bvh_threshold: usize,
    /// Medium densities closer than this to zero snap to vacuum
    pub medium_epsilon: f32,
    /// Free medium-boundary crossings allowed per path
    pub max_boundary_crossings: u32,
    /// Aperture shape
    pub bokeh: Bokeh,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sky: Sky::default(),
            bvh_threshold: DEFAULT_BVH_THRESHOLD,
            medium_epsilon: 1e-4,
            max_boundary_crossings: 256,
            bokeh: Bokeh::Disk,
        }
    }
}

/// Per-pixel running sums in RGBA32F. Alpha counts accumulated samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl AccumulationBuffer {
    /// Create a zeroed buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    /// Pixel at (x, y), or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Zero every pixel and match the given size.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, [0.0; 4]);
    }
}

/// Resolved, gamma-encoded colors ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

impl DisplayImage {
    /// Create a black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width as usize * height as usize],
        }
    }

    /// Pixel at (x, y), or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<Vec3> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

/// Convert an already gamma-encoded color to 8-bit RGBA.
pub fn color_to_rgba(color: Vec3) -> [u8; 4] {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

/// Add one sample to a running sum. The first frame ignores `previous`.
#[inline]
pub fn accumulate(previous: [f32; 4], sample: Vec3, frame_count: u32) -> [f32; 4] {
    let base = if frame_count <= 1 { [0.0; 4] } else { previous };
    [
        base[0] + sample.x,
        base[1] + sample.y,
        base[2] + sample.z,
        base[3] + 1.0,
    ]
}

/// Average a running sum over `frame_count` frames and gamma-encode it.
#[inline]
pub fn resolve(accumulated: [f32; 4], frame_count: u32, gamma: f32) -> Vec3 {
    let mean = Vec3::new(accumulated[0], accumulated[1], accumulated[2]) / frame_count.max(1) as f32;
    let inv_gamma = if gamma > 0.0 { 1.0 / gamma } else { 1.0 };
    mean.max(Vec3::ZERO).powf(inv_gamma)
}

/// What one pixel invocation produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelOutput {
    /// New running sum for the current buffer
    pub accumulated: [f32; 4],
    /// Gamma-encoded mean for display
    pub display: Vec3,
}

/// Run one pixel invocation: seed, generate a camera ray, trace, accumulate.
pub fn render_pixel(
    query: &SceneQuery,
    uniforms: &FrameUniforms,
    config: &RenderConfig,
    pixel: UVec2,
    previous: &AccumulationBuffer,
) -> PixelOutput {
    let resolution = UVec2::new(uniforms.width, uniforms.height);
    let mut sampler = Sampler::for_pixel(pixel, uniforms.width, uniforms.elapsed_seconds, uniforms.frame_count);

    let camera = &uniforms.camera;
    let ray = generate_ray(camera, pixel, resolution, config.bokeh, &mut sampler);
    let sample = trace_path(query, config, ray, camera.max_ray_bounces, &mut sampler);

    let previous = previous.get(pixel.x, pixel.y).unwrap_or([0.0; 4]);
    let accumulated = accumulate(previous, sample.radiance, uniforms.frame_count);

    PixelOutput {
        accumulated,
        display: resolve(accumulated, uniforms.frame_count, uniforms.gamma_correction),
    }
}

/// Render one progressive frame.
///
/// Reads only `previous`; `current` is resized if needed and fully
/// overwritten. Rows are distributed across the rayon thread pool.
pub fn render_frame(
    scene: &Scene,
    uniforms: &FrameUniforms,
    config: &RenderConfig,
    previous: &AccumulationBuffer,
    current: &mut AccumulationBuffer,
) -> DisplayImage {
    let width = uniforms.width;
    let height = uniforms.height;

    if current.width != width || current.height != height {
        current.reset(width, height);
    }

    let mut display = DisplayImage::new(width, height);
    if uniforms.pixel_count() == 0 {
        return display;
    }

    let query = SceneQuery::new(scene, config.bvh_threshold);
    if uniforms.frame_count <= 1 && scene.triangle_count() >= config.bvh_threshold && !query.uses_bvh() {
        log::warn!(
            "{} triangles but no BVH; falling back to linear search",
            scene.triangle_count()
        );
    }

    current
        .pixels
        .par_chunks_mut(width as usize)
        .zip(display.pixels.par_chunks_mut(width as usize))
        .enumerate()
        .for_each(|(y, (accumulated_row, display_row))| {
            for x in 0..width {
                let output = render_pixel(&query, uniforms, config, UVec2::new(x, y as u32), previous);
                accumulated_row[x as usize] = output.accumulated;
                display_row[x as usize] = output.display;
            }
        });

    display
}
