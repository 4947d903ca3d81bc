//! Shrimpy Renderer - progressive Monte Carlo path tracing core.
//!
//! Everything here runs once per pixel per frame with no shared mutable
//! state, so frames parallelize trivially:
//!
//! - [`sampler`]: per-pixel xorshift RNG with Jenkins seed hashing
//! - [`camera`]: thin-lens primary rays with aperture and jitter
//! - [`sphere`], [`triangle`]: closed-form intersectors
//! - [`bvh`]: stack-bounded traversal of the flat BVH
//! - [`query`]: nearest hit over spheres and triangles
//! - [`integrator`]: surface, dielectric and volumetric path transport
//! - [`renderer`]: accumulation, gamma resolve and whole-frame rendering
//!
//! # Example
//!
//! ```ignore
//! use shrimpy_core::{Camera, FrameUniforms, Scene};
//! use shrimpy_renderer::{render_frame, AccumulationBuffer, RenderConfig};
//!
//! let scene = Scene::new();
//! let mut uniforms = FrameUniforms::new(Camera::new(), 320, 240);
//! let mut previous = AccumulationBuffer::new(320, 240);
//! let mut current = AccumulationBuffer::new(320, 240);
//!
//! for frame in 0..64 {
//!     uniforms.advance(frame as f32 / 60.0);
//!     let image = render_frame(&scene, &uniforms, &RenderConfig::default(), &previous, &mut current);
//!     std::mem::swap(&mut previous, &mut current);
//! }
//! ```

pub mod bvh;
pub mod camera;
pub mod hittable;
pub mod integrator;
pub mod material;
pub mod query;
pub mod renderer;
pub mod sampler;
pub mod sphere;
pub mod triangle;

// Re-export commonly used types
pub use bvh::hit_bvh;
pub use camera::{generate_ray, Bokeh};
pub use hittable::{hit_distance, Hit, NO_HIT};
pub use integrator::{trace_path, Medium, PathSample, Termination};
pub use query::SceneQuery;
pub use renderer::{
    accumulate, render_frame, render_pixel, resolve, AccumulationBuffer, DisplayImage,
    PixelOutput, RenderConfig, Sky,
};
pub use sampler::Sampler;
pub use sphere::hit_sphere;
pub use triangle::hit_triangle;
