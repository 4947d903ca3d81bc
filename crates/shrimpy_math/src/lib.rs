// Re-export glam for convenience
pub use glam::*;

// Shrimpy math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Smallest distance accepted as a real intersection.
///
/// Hits closer than this to a ray origin are treated as self-intersections
/// of a freshly spawned ray and rejected. Also used as the offset applied
/// when a new ray leaves a surface.
pub const EPSILON: f32 = 1e-4;
