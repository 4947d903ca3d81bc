//! Sphere and triangle records.

use bytemuck::{Pod, Zeroable};
use shrimpy_math::{Aabb, Vec3};

/// A sphere in upload layout (32 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material_id: u32,
    _pad0: [u32; 3],
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material_id: u32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material_id,
            _pad0: [0; 3],
        }
    }
}

/// A triangle in upload layout (64 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Triangle {
    pub vertex_0: Vec3,
    _pad0: u32,
    pub vertex_1: Vec3,
    _pad1: u32,
    pub vertex_2: Vec3,
    _pad2: u32,
    pub material_id: u32,
    _pad3: [u32; 3],
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(vertices: [Vec3; 3], material_id: u32) -> Self {
        Self {
            vertex_0: vertices[0],
            _pad0: 0,
            vertex_1: vertices[1],
            _pad1: 0,
            vertex_2: vertices[2],
            _pad2: 0,
            material_id,
            _pad3: [0; 3],
        }
    }

    #[inline]
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.vertex_0, self.vertex_1, self.vertex_2]
    }

    /// Axis-aligned bounds of the three vertices.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertex_0, self.vertex_1).include(self.vertex_2)
    }

    pub fn centroid(&self) -> Vec3 {
        (self.vertex_0 + self.vertex_1 + self.vertex_2) / 3.0
    }

    /// Scale about the origin, then translate.
    pub fn transformed(&self, scale: Vec3, offset: Vec3) -> Self {
        let [a, b, c] = self.vertices();
        Self::new([a * scale + offset, b * scale + offset, c * scale + offset], self.material_id)
    }
}
