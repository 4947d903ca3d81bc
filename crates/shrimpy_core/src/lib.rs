//! Shrimpy Core - scene data for the progressive path tracer.
//!
//! This crate provides:
//!
//! - **Upload-format records**: `Material`, `Sphere`, `Triangle`, `BvhNode`,
//!   `Camera` and `FrameUniforms`, laid out `#[repr(C)]` so the same buffers
//!   can be handed to a GPU backend unchanged
//! - **Scene**: fixed-capacity arrays with explicit live counts
//! - **BVH construction**: a flat, index-linked tree over the scene triangles
//! - **Scene input**: Wavefront OBJ meshes and JSON scene descriptions
//!
//! # Example
//!
//! ```ignore
//! use shrimpy_core::SceneDescription;
//!
//! let description = SceneDescription::load("scene.json")?;
//! let scene = description.build_scene()?;
//! println!("{} spheres, {} triangles", scene.sphere_count(), scene.triangle_count());
//! ```

pub mod bvh;
pub mod camera;
pub mod description;
pub mod error;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod scene;

// Re-export commonly used types
pub use bvh::{BvhNode, LEAF_MAX_SIZE};
pub use camera::{Camera, FrameUniforms};
pub use description::SceneDescription;
pub use error::{SceneError, SceneResult};
pub use material::{Material, MaterialKind};
pub use primitives::{Sphere, Triangle};
pub use scene::{Scene, MAX_BVH_NODES, MAX_MATERIALS, MAX_SPHERES, MAX_TRIANGLES};
