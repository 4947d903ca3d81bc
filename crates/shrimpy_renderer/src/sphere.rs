//! Ray-sphere intersection.

use std::f32::consts::PI;

use shrimpy_core::Sphere;
use shrimpy_math::{Ray, Vec2, Vec3, EPSILON};

use crate::hittable::Hit;

/// Nearest intersection of `ray` with `sphere` beyond [`EPSILON`].
///
/// When the near root lies behind the origin the far root is used and the
/// hit is reported as back-facing, with the normal pointing inward.
pub fn hit_sphere(ray: &Ray, sphere: &Sphere) -> Option<Hit> {
    let oc = ray.origin - sphere.center;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - sphere.radius * sphere.radius;

    // Sitting on the surface and heading outward.
    if c.abs() < EPSILON && half_b >= 0.0 {
        return None;
    }

    let discriminant = half_b * half_b - a * c;
    if discriminant < EPSILON {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    let mut t = (-half_b - sqrtd) / a;
    let mut front_face = true;
    if t < EPSILON {
        t = (-half_b + sqrtd) / a;
        front_face = false;
        if t < EPSILON {
            return None;
        }
    }

    let p = ray.at(t);
    let outward = (p - sphere.center) / sphere.radius;
    let normal = if front_face { outward } else { -outward };

    Some(Hit {
        t,
        p,
        normal,
        material_id: sphere.material_id,
        front_face,
        uv: sphere_uv(outward),
    })
}

/// Spherical UV for a point on the unit sphere.
fn sphere_uv(p: Vec3) -> Vec2 {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    Vec2::new(phi / (2.0 * PI), theta / PI)
}
