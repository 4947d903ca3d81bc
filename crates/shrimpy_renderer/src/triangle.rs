//! Ray-triangle intersection.

use shrimpy_core::Triangle;
use shrimpy_math::{Ray, Vec2, EPSILON};

use crate::hittable::Hit;

/// Determinants below this magnitude are treated as parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Intersect `ray` with a single triangle, either side.
///
/// The test always runs in a front-facing frame: when the ray arrives from
/// the back, the edges are swapped and the normal and determinant flipped.
/// `uv` holds the barycentric weights of `vertex_1` and `vertex_2`.
pub fn hit_triangle(ray: &Ray, triangle: &Triangle) -> Option<Hit> {
    let mut edge_a = triangle.vertex_1 - triangle.vertex_0;
    let mut edge_b = triangle.vertex_2 - triangle.vertex_0;
    let mut normal = edge_b.cross(edge_a);
    let mut det = -ray.direction.dot(normal);

    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let front_face = det > 0.0;
    if !front_face {
        std::mem::swap(&mut edge_a, &mut edge_b);
        normal = -normal;
        det = -det;
    }

    let ao = ray.origin - triangle.vertex_0;
    let dao = ao.cross(ray.direction);
    let inv_det = 1.0 / det;

    let t = ao.dot(normal) * inv_det;
    let u = -edge_b.dot(dao) * inv_det;
    let v = edge_a.dot(dao) * inv_det;
    let w = 1.0 - u - v;

    if t < EPSILON || u < 0.0 || v < 0.0 || w < 0.0 {
        return None;
    }

    // Undo the edge swap so weights always refer to the stored vertices.
    let uv = if front_face { Vec2::new(u, v) } else { Vec2::new(v, u) };

    Some(Hit {
        t,
        p: ray.at(t),
        normal: normal.normalize(),
        material_id: triangle.material_id,
        front_face,
        uv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shrimpy_math::Vec3;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            2,
        )
    }

    #[test]
    fn test_triangle_front_hit() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, -1.0), Vec3::Z);
        let hit = hit_triangle(&ray, &unit_triangle()).unwrap();

        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!(hit.front_face);
        assert!((hit.uv.x - 0.2).abs() < 1e-5);
        assert!((hit.uv.y - 0.2).abs() < 1e-5);
        assert!((hit.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert_eq!(hit.material_id, 2);
    }

    #[test]
    fn test_triangle_back_hit() {
        let ray = Ray::new(Vec3::new(0.3, 0.1, 1.0), -Vec3::Z);
        let hit = hit_triangle(&ray, &unit_triangle()).unwrap();

        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!(!hit.front_face);
        assert!(hit.normal.dot(ray.direction) < 0.0);
        // Weights still refer to vertex_1 and vertex_2.
        assert!((hit.uv.x - 0.3).abs() < 1e-5);
        assert!((hit.uv.y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_weights_locate_hit_point() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.6, 0.25, -2.0), Vec3::Z);
        let hit = hit_triangle(&ray, &tri).unwrap();

        let w = 1.0 - hit.uv.x - hit.uv.y;
        let rebuilt = tri.vertex_0 * w + tri.vertex_1 * hit.uv.x + tri.vertex_2 * hit.uv.y;
        assert!((rebuilt - hit.p).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside() {
        let ray = Ray::new(Vec3::new(0.8, 0.8, -1.0), Vec3::Z);
        assert!(hit_triangle(&ray, &unit_triangle()).is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 0.0), Vec3::X);
        assert!(hit_triangle(&ray, &unit_triangle()).is_none());
    }

    #[test]
    fn test_triangle_behind_origin() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::Z);
        assert!(hit_triangle(&ray, &unit_triangle()).is_none());
    }

    #[test]
    fn test_barycentric_weights_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut hits = 0;

        for _ in 0..2000 {
            let mut vertex = || Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(2.0..4.0));
            let tri = Triangle::new([vertex(), vertex(), vertex()], 0);
            let target = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 3.0);
            let ray = Ray::normalized(Vec3::ZERO, target);

            if let Some(hit) = hit_triangle(&ray, &tri) {
                hits += 1;
                let w = 1.0 - hit.uv.x - hit.uv.y;
                assert!(hit.uv.x >= 0.0 && hit.uv.y >= 0.0 && w >= 0.0);
                assert!((hit.uv.x + hit.uv.y + w - 1.0).abs() < 1e-5);
            }
        }

        assert!(hits > 0);
    }
}
