//! The scene buffer consumed by the renderer.
//!
//! Geometry, materials and the BVH live in fixed-capacity arrays with
//! explicit live counts, matching the read-only buffer a GPU backend would
//! bind. The host fills it once per frame (or once per scene); rendering
//! only ever reads it.

use bytemuck::{Pod, Zeroable};

use crate::bvh::{self, BvhNode};
use crate::error::{SceneError, SceneResult};
use crate::material::Material;
use crate::primitives::{Sphere, Triangle};

pub const MAX_MATERIALS: usize = 64;
pub const MAX_SPHERES: usize = 64;
pub const MAX_TRIANGLES: usize = 256;
/// Enough for a median-split tree over [`MAX_TRIANGLES`] with four
/// triangles per leaf.
pub const MAX_BVH_NODES: usize = 128;

/// Scene buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Scene {
    materials: [Material; MAX_MATERIALS],
    spheres: [Sphere; MAX_SPHERES],
    triangles: [Triangle; MAX_TRIANGLES],
    bvh_nodes: [BvhNode; MAX_BVH_NODES],
    material_count: u32,
    sphere_count: u32,
    triangle_count: u32,
    bvh_node_count: u32,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            materials: [Material::DEFAULT; MAX_MATERIALS],
            ..Zeroable::zeroed()
        }
    }

    /// Add a material and return its id.
    pub fn add_material(&mut self, material: Material) -> SceneResult<u32> {
        let id = self.material_count as usize;
        if id >= MAX_MATERIALS {
            return Err(SceneError::CapacityExceeded {
                what: "materials",
                capacity: MAX_MATERIALS,
            });
        }
        self.materials[id] = material;
        self.material_count += 1;
        Ok(id as u32)
    }

    /// Add a sphere.
    pub fn add_sphere(&mut self, sphere: Sphere) -> SceneResult<()> {
        self.check_material(sphere.material_id)?;
        let index = self.sphere_count as usize;
        if index >= MAX_SPHERES {
            return Err(SceneError::CapacityExceeded {
                what: "spheres",
                capacity: MAX_SPHERES,
            });
        }
        self.spheres[index] = sphere;
        self.sphere_count += 1;
        Ok(())
    }

    /// Add a triangle.
    ///
    /// Invalidates any previously built BVH; call [`Scene::build_bvh`] once
    /// all triangles are in.
    pub fn add_triangle(&mut self, triangle: Triangle) -> SceneResult<()> {
        self.check_material(triangle.material_id)?;
        let index = self.triangle_count as usize;
        if index >= MAX_TRIANGLES {
            return Err(SceneError::CapacityExceeded {
                what: "triangles",
                capacity: MAX_TRIANGLES,
            });
        }
        self.triangles[index] = triangle;
        self.triangle_count += 1;
        self.bvh_node_count = 0;
        Ok(())
    }

    /// Add several triangles, stopping at the first failure.
    pub fn add_triangles<I>(&mut self, triangles: I) -> SceneResult<()>
    where
        I: IntoIterator<Item = Triangle>,
    {
        for triangle in triangles {
            self.add_triangle(triangle)?;
        }
        Ok(())
    }

    /// Build the BVH over the current triangles. Returns the node count.
    pub fn build_bvh(&mut self) -> SceneResult<usize> {
        let nodes = bvh::build(self.triangles(), MAX_BVH_NODES)?;
        self.set_bvh(&nodes)?;
        Ok(nodes.len())
    }

    /// Install an externally built BVH.
    pub fn set_bvh(&mut self, nodes: &[BvhNode]) -> SceneResult<()> {
        if nodes.len() > MAX_BVH_NODES {
            return Err(SceneError::CapacityExceeded {
                what: "BVH nodes",
                capacity: MAX_BVH_NODES,
            });
        }
        self.bvh_nodes[..nodes.len()].copy_from_slice(nodes);
        self.bvh_node_count = nodes.len() as u32;
        Ok(())
    }

    fn check_material(&self, id: u32) -> SceneResult<()> {
        if id >= self.material_count {
            return Err(SceneError::UnknownMaterial {
                id,
                count: self.material_count,
            });
        }
        Ok(())
    }

    /// Material by id. Out-of-range ids resolve to [`Material::DEFAULT`].
    #[inline]
    pub fn material(&self, id: u32) -> &Material {
        self.materials().get(id as usize).unwrap_or(&Material::DEFAULT)
    }

    #[inline]
    pub fn materials(&self) -> &[Material] {
        &self.materials[..self.material_count as usize]
    }

    #[inline]
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres[..self.sphere_count as usize]
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles[..self.triangle_count as usize]
    }

    #[inline]
    pub fn bvh_nodes(&self) -> &[BvhNode] {
        &self.bvh_nodes[..self.bvh_node_count as usize]
    }

    pub fn sphere_count(&self) -> usize {
        self.sphere_count as usize
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count as usize
    }

    /// Raw bytes of the whole buffer, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrimpy_math::Vec3;

    fn unit_triangle(material_id: u32) -> Triangle {
        Triangle::new([Vec3::ZERO, Vec3::X, Vec3::Y], material_id)
    }

    #[test]
    fn test_new_scene_is_empty() {
        let scene = Scene::new();

        assert!(scene.materials().is_empty());
        assert!(scene.spheres().is_empty());
        assert!(scene.triangles().is_empty());
        assert!(scene.bvh_nodes().is_empty());
        assert_eq!(*scene.material(3), Material::DEFAULT);
    }

    #[test]
    fn test_add_primitives() {
        let mut scene = Scene::new();
        let red = scene.add_material(Material::diffuse(Vec3::X, 1.0)).unwrap();

        scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, red)).unwrap();
        scene.add_triangle(unit_triangle(red)).unwrap();

        assert_eq!(scene.sphere_count(), 1);
        assert_eq!(scene.triangle_count(), 1);
        assert_eq!(scene.material(red).color, Vec3::X);
    }

    #[test]
    fn test_unknown_material_rejected() {
        let mut scene = Scene::new();
        let err = scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, 0)).unwrap_err();

        assert!(matches!(err, SceneError::UnknownMaterial { id: 0, count: 0 }));
    }

    #[test]
    fn test_sphere_capacity() {
        let mut scene = Scene::new();
        let id = scene.add_material(Material::DEFAULT).unwrap();

        for _ in 0..MAX_SPHERES {
            scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, id)).unwrap();
        }
        let err = scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, id)).unwrap_err();

        assert!(matches!(err, SceneError::CapacityExceeded { what: "spheres", .. }));
        assert_eq!(scene.sphere_count(), MAX_SPHERES);
    }

    #[test]
    fn test_triangle_capacity() {
        let mut scene = Scene::new();
        let id = scene.add_material(Material::DEFAULT).unwrap();

        let result = scene.add_triangles(std::iter::repeat(unit_triangle(id)).take(MAX_TRIANGLES + 1));

        assert!(result.is_err());
        assert_eq!(scene.triangle_count(), MAX_TRIANGLES);
    }

    #[test]
    fn test_build_bvh_and_invalidate() {
        let mut scene = Scene::new();
        let id = scene.add_material(Material::DEFAULT).unwrap();
        scene
            .add_triangles((0..20).map(|i| {
                let offset = Vec3::new(i as f32, 0.0, 0.0);
                Triangle::new([offset, offset + Vec3::X, offset + Vec3::Y], id)
            }))
            .unwrap();

        let nodes = scene.build_bvh().unwrap();
        assert_eq!(scene.bvh_nodes().len(), nodes);
        assert!(nodes > 1);

        scene.add_triangle(unit_triangle(id)).unwrap();
        assert!(scene.bvh_nodes().is_empty());
    }

    #[test]
    fn test_as_bytes_covers_whole_buffer() {
        let scene = Scene::new();
        assert_eq!(scene.as_bytes().len(), std::mem::size_of::<Scene>());
    }
}
