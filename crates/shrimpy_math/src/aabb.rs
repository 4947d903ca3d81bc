use crate::{Interval, Ray, Vec3};
use bytemuck::{Pod, Zeroable};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as its two corners so the layout can be uploaded as-is.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corner points in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Grow the box to include a point.
    pub fn include(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Slab test: the parametric range over which the ray is inside the box.
    ///
    /// Returns `Some([t_near, t_far])` whenever `t_near <= t_far`. The range is
    /// not clamped to the ray's forward half or to any existing closest hit;
    /// callers do that.
    pub fn hit(&self, r: &Ray) -> Option<Interval> {
        let inv_dir = r.direction.recip();
        let t0 = (self.min - r.origin) * inv_dir;
        let t1 = (self.max - r.origin) * inv_dir;

        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();

        if t_near <= t_far {
            Some(Interval::new(t_near, t_far))
        } else {
            None
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;

        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Pad degenerate (flat) axes so slab tests against them stay stable.
    pub fn padded(&self, delta: f32) -> Self {
        let size = self.max - self.min;
        let pad = Vec3::select(size.cmplt(Vec3::splat(delta)), Vec3::splat(delta * 0.5), Vec3::ZERO);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// An empty box: surrounding it with anything yields the other box.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };
}
