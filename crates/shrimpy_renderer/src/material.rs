//! Surface scattering for the two material models.
//!
//! - **Diffuse**: blend between mirror reflection and a cosine-like lobe
//!   around the normal, weighted by roughness
//! - **Dielectric**: reflect or refract, chosen by Schlick's Fresnel
//!   approximation with total internal reflection

use shrimpy_core::{Material, MaterialKind};
use shrimpy_math::Vec3;

use crate::hittable::Hit;
use crate::sampler::Sampler;

/// Length of the random offset added to the normal for the diffuse lobe.
/// Kept just under one so the sum never cancels to zero.
const DIFFUSE_LOBE_SCALE: f32 = 0.999;

/// Pick an outgoing unit direction for a ray arriving along `direction`.
pub fn scatter(material: &Material, direction: Vec3, hit: &Hit, sampler: &mut Sampler) -> Vec3 {
    let unit_direction = direction.normalize();

    match material.kind() {
        MaterialKind::Diffuse { roughness } => {
            let specular = reflect(unit_direction, hit.normal);
            let diffuse = (hit.normal + sampler.sample_sphere_direction() * DIFFUSE_LOBE_SCALE).normalize();

            specular.lerp(diffuse, roughness).try_normalize().unwrap_or(hit.normal)
        }
        MaterialKind::Dielectric { ior } => {
            let refraction_ratio = if hit.front_face { 1.0 / ior } else { ior };

            let cos_theta = (-unit_direction).dot(hit.normal).min(1.0);
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

            let cannot_refract = refraction_ratio * sin_theta > 1.0;
            let direction = if cannot_refract || reflectance(cos_theta, refraction_ratio) > sampler.next_f32() {
                reflect(unit_direction, hit.normal)
            } else {
                refract(unit_direction, hit.normal, refraction_ratio)
            };

            direction.try_normalize().unwrap_or(unit_direction)
        }
    }
}

/// Schlick's approximation for reflectance.
#[inline]
pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
