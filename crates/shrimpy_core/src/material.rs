//! Surface and medium materials.

use bytemuck::{Pod, Zeroable};
use shrimpy_math::Vec3;

/// How a surface scatters light, decoded from a [`Material`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    /// Mix of mirror reflection and diffuse scattering.
    /// 0 = perfect mirror, 1 = fully diffuse.
    Diffuse { roughness: f32 },
    /// Refractive surface with the given index of refraction.
    Dielectric { ior: f32 },
}

/// A material record in upload layout (32 bytes).
///
/// The scattering model is packed into a single signed float so the record
/// matches the GPU buffer: non-negative values are a diffuse/specular mix
/// weight, negative values store a dielectric's index of refraction. Read it
/// through [`Material::kind`] rather than the raw field.
///
/// A `volume_density` of exactly 1.0 marks an opaque surface. Anything below
/// that makes the surface the boundary of a participating medium with that
/// density.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub color: Vec3,
    roughness_or_ior: f32,
    pub emission_strength: f32,
    pub volume_density: f32,
    _pad0: [u32; 2],
}

impl Material {
    /// Opaque white diffuse material.
    pub const DEFAULT: Material = Material {
        color: Vec3::ONE,
        roughness_or_ior: 1.0,
        emission_strength: 0.0,
        volume_density: 1.0,
        _pad0: [0; 2],
    };

    /// Create an opaque diffuse/specular material.
    ///
    /// `roughness` is clamped to [0, 1].
    pub fn diffuse(color: Vec3, roughness: f32) -> Self {
        Self {
            color,
            roughness_or_ior: roughness.clamp(0.0, 1.0),
            ..Self::DEFAULT
        }
    }

    /// Create a dielectric (glass-like) material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn dielectric(color: Vec3, ior: f32) -> Self {
        Self {
            color,
            roughness_or_ior: -ior.abs(),
            ..Self::DEFAULT
        }
    }

    /// Set the self-emission multiplier.
    pub fn with_emission(mut self, strength: f32) -> Self {
        self.emission_strength = strength;
        self
    }

    /// Make this material the boundary of a participating medium.
    ///
    /// Values of 1.0 or more mean fully opaque.
    pub fn with_volume_density(mut self, density: f32) -> Self {
        self.volume_density = density.max(0.0);
        self
    }

    /// Decode the packed scattering model.
    #[inline]
    pub fn kind(&self) -> MaterialKind {
        if self.roughness_or_ior >= 0.0 {
            MaterialKind::Diffuse {
                roughness: self.roughness_or_ior,
            }
        } else {
            MaterialKind::Dielectric {
                ior: -self.roughness_or_ior,
            }
        }
    }

    /// True if this surface bounds a participating medium rather than
    /// blocking light.
    #[inline]
    pub fn is_medium_boundary(&self) -> bool {
        self.volume_density < 1.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT
    }
}
