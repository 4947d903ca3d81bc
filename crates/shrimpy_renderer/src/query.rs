//! Nearest-hit queries against a whole scene.

use shrimpy_core::{Scene, Sphere, Triangle};
use shrimpy_math::{Interval, Ray, EPSILON};

use crate::bvh::hit_bvh;
use crate::hittable::{hit_distance, Hit};
use crate::sphere::hit_sphere;
use crate::triangle::hit_triangle;

/// Default triangle count at which the BVH takes over from linear search.
pub const DEFAULT_BVH_THRESHOLD: usize = 16;

/// Nearest sphere hit within `range`.
pub fn hit_spheres_linear(spheres: &[Sphere], ray: &Ray, range: Interval) -> Option<Hit> {
    let mut range = range;
    let mut closest = None;

    for sphere in spheres {
        if let Some(hit) = hit_sphere(ray, sphere) {
            if range.admits(hit.t) {
                range = range.clamp_max(hit.t);
                closest = Some(hit);
            }
        }
    }

    closest
}

/// Nearest triangle hit within `range`, testing every triangle.
pub fn hit_triangles_linear(triangles: &[Triangle], ray: &Ray, range: Interval) -> Option<Hit> {
    let mut range = range;
    let mut closest = None;

    for triangle in triangles {
        if let Some(hit) = hit_triangle(ray, triangle) {
            if range.admits(hit.t) {
                range = range.clamp_max(hit.t);
                closest = Some(hit);
            }
        }
    }

    closest
}

/// Read-only view of a scene used by every pixel of a frame.
#[derive(Clone, Copy)]
pub struct SceneQuery<'a> {
    scene: &'a Scene,
    bvh_threshold: usize,
}

impl<'a> SceneQuery<'a> {
    pub fn new(scene: &'a Scene, bvh_threshold: usize) -> Self {
        Self {
            scene,
            bvh_threshold,
        }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// True when triangle queries go through the BVH.
    ///
    /// Scenes at or above the threshold without a built tree fall back to
    /// linear search.
    pub fn uses_bvh(&self) -> bool {
        self.scene.triangle_count() >= self.bvh_threshold && !self.scene.bvh_nodes().is_empty()
    }

    /// Nearest hit of `ray` against all spheres and triangles.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        let range = Interval::new(EPSILON, f32::MAX);
        let sphere_hit = hit_spheres_linear(self.scene.spheres(), ray, range);

        // Only triangles strictly closer than the best sphere can win.
        let range = range.clamp_max(sphere_hit.map_or(f32::MAX, |h| h.t));
        let triangle_hit = if self.uses_bvh() {
            hit_bvh(self.scene.bvh_nodes(), self.scene.triangles(), ray, range)
        } else {
            hit_triangles_linear(self.scene.triangles(), ray, range)
        };

        triangle_hit.or(sphere_hit)
    }

    /// Distance to the nearest hit, or [`NO_HIT`](crate::hittable::NO_HIT).
    pub fn nearest_distance(&self, ray: &Ray) -> f32 {
        hit_distance(self.nearest_hit(ray).as_ref())
    }
}
