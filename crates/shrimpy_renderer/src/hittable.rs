//! Surface hit records.

use shrimpy_math::{Vec2, Vec3};

/// Distance reported for a ray that hits nothing.
pub const NO_HIT: f32 = -1.0;

/// Information about a ray-surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the hit
    pub t: f32,
    /// Hit point
    pub p: Vec3,
    /// Unit normal, facing against the incoming ray
    pub normal: Vec3,
    /// Index into the scene's material table
    pub material_id: u32,
    /// True if the ray hit the outward/front side
    pub front_face: bool,
    /// Surface coordinates (spherical for spheres, barycentric for triangles)
    pub uv: Vec2,
}

/// Hit distance, or [`NO_HIT`] when there is none.
pub fn hit_distance(hit: Option<&Hit>) -> f32 {
    hit.map_or(NO_HIT, |h| h.t)
}
