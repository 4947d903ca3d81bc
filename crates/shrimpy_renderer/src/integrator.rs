//! Iterative path integration with surface and volumetric transport.
//!
//! A path starts with unit throughput and no enclosing medium. Each loop
//! iteration finds the nearest surface and then does exactly one of:
//!
//! - scatter inside the current medium before reaching the surface
//! - cross a medium boundary (free, does not use up a bounce)
//! - shade an opaque surface and pick a new direction
//!
//! The loop ends when the ray escapes to the sky, the throughput drops to
//! black, or the bounce budget runs out.

use shrimpy_core::Material;
use shrimpy_math::{Ray, Vec3, EPSILON};

use crate::material::scatter;
use crate::query::SceneQuery;
use crate::renderer::RenderConfig;
use crate::sampler::{Sampler, LOG_FLOOR};

/// How a path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Missed all geometry and picked up the sky.
    Escaped,
    /// Throughput became exactly black.
    Absorbed,
    /// Used every bounce.
    BounceLimit,
    /// Crossed too many medium boundaries.
    CrossingLimit,
}

/// Result of tracing one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub radiance: Vec3,
    pub termination: Termination,
    pub bounces: u32,
}

/// Homogeneous medium surrounding the ray.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Medium {
    pub density: f32,
    pub radiance: f32,
}

impl Medium {
    /// Account for crossing the boundary of `material`.
    pub fn cross(&mut self, material: &Material, entering: bool, epsilon: f32) {
        if entering {
            self.density += material.volume_density;
            self.radiance += material.emission_strength;
        } else {
            self.density -= material.volume_density;
            self.radiance -= material.emission_strength;
        }

        if self.density.abs() < epsilon {
            *self = Medium::default();
        }
    }

    #[inline]
    pub fn is_vacuum(&self) -> bool {
        self.density <= 0.0
    }
}

/// Trace one path through the scene.
pub fn trace_path(
    query: &SceneQuery,
    config: &RenderConfig,
    ray: Ray,
    max_bounces: u32,
    sampler: &mut Sampler,
) -> PathSample {
    let mut ray = ray;
    let mut throughput = Vec3::ONE;
    let mut radiance = Vec3::ZERO;
    let mut medium = Medium::default();
    let mut bounces = 0;
    let mut crossings = 0;

    let finish = |radiance, termination, bounces| PathSample {
        radiance,
        termination,
        bounces,
    };

    while bounces < max_bounces {
        let Some(hit) = query.nearest_hit(&ray) else {
            radiance += throughput * config.sky.color(&ray);
            return finish(radiance, Termination::Escaped, bounces);
        };

        let material = query.scene().material(hit.material_id);
        let tinted = throughput * material.color;
        if tinted == Vec3::ZERO {
            return finish(radiance, Termination::Absorbed, bounces);
        }

        if !medium.is_vacuum() {
            let free_path = -sampler.next_f32().max(LOG_FLOOR).ln() / medium.density;
            if free_path < hit.t {
                let transmittance = (-medium.density * free_path).exp();
                radiance += throughput * medium.radiance * (1.0 - transmittance);
                throughput *= transmittance;

                ray = Ray::new(ray.at(free_path), sampler.sample_sphere_direction());
                bounces += 1;
                continue;
            }
        }

        if material.is_medium_boundary() {
            if crossings >= config.max_boundary_crossings {
                return finish(radiance, Termination::CrossingLimit, bounces);
            }
            crossings += 1;

            medium.cross(material, hit.front_face, config.medium_epsilon);
            ray = Ray::new(hit.p, ray.direction).advanced(EPSILON);
            continue;
        }

        throughput = tinted;
        radiance += throughput * material.emission_strength;

        let direction = scatter(material, ray.direction, &hit, sampler);
        ray = Ray::new(hit.p, direction).advanced(EPSILON);
        bounces += 1;
    }

    finish(radiance, Termination::BounceLimit, bounces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::DEFAULT_BVH_THRESHOLD;
    use crate::renderer::Sky;
    use shrimpy_core::{Scene, Sphere};

    fn config(sky: Sky) -> RenderConfig {
        RenderConfig {
            sky,
            ..RenderConfig::default()
        }
    }

    fn single_sphere(material: Material) -> Scene {
        let mut scene = Scene::new();
        let id = scene.add_material(material).unwrap();
        scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, id)).unwrap();
        scene
    }

    fn toward_sphere() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::Z)
    }

    #[test]
    fn test_escaped_ray_sees_sky() {
        let scene = Scene::new();
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let sky = Vec3::new(0.2, 0.4, 0.6);
        let mut sampler = Sampler::from_state(1);

        let sample = trace_path(&query, &config(Sky::Constant { color: sky }), toward_sphere(), 8, &mut sampler);

        assert_eq!(sample.termination, Termination::Escaped);
        assert_eq!(sample.radiance, sky);
        assert_eq!(sample.bounces, 0);
    }

    #[test]
    fn test_black_surface_absorbs() {
        let scene = single_sphere(Material::diffuse(Vec3::ZERO, 1.0));
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let mut sampler = Sampler::from_state(2);

        let sample = trace_path(&query, &config(Sky::Constant { color: Vec3::ONE }), toward_sphere(), 8, &mut sampler);

        assert_eq!(sample.termination, Termination::Absorbed);
        assert_eq!(sample.radiance, Vec3::ZERO);
    }

    #[test]
    fn test_emitter_contributes_color_times_strength() {
        let light = Material::diffuse(Vec3::new(1.0, 0.5, 0.25), 1.0).with_emission(4.0);
        let scene = single_sphere(light);
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let mut sampler = Sampler::from_state(3);

        let sample = trace_path(&query, &config(Sky::Black), toward_sphere(), 1, &mut sampler);

        assert_eq!(sample.termination, Termination::BounceLimit);
        assert!((sample.radiance - Vec3::new(4.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_bounce_budget_returns_nothing() {
        let scene = single_sphere(Material::DEFAULT);
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let mut sampler = Sampler::from_state(4);

        let sample = trace_path(&query, &config(Sky::Constant { color: Vec3::ONE }), toward_sphere(), 0, &mut sampler);

        assert_eq!(sample.termination, Termination::BounceLimit);
        assert_eq!(sample.radiance, Vec3::ZERO);
    }

    #[test]
    fn test_black_sky_without_emitters_is_dark() {
        let scene = single_sphere(Material::diffuse(Vec3::splat(0.8), 1.0));
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let mut sampler = Sampler::from_state(5);

        for _ in 0..100 {
            let sample = trace_path(&query, &config(Sky::Black), toward_sphere(), 16, &mut sampler);
            assert_eq!(sample.radiance, Vec3::ZERO);
        }
    }

    #[test]
    fn test_energy_bounded_by_sky() {
        let scene = single_sphere(Material::diffuse(Vec3::new(0.9, 0.6, 0.3), 0.5));
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let mut sampler = Sampler::from_state(6);

        for _ in 0..500 {
            let sample = trace_path(&query, &config(Sky::Constant { color: Vec3::ONE }), toward_sphere(), 16, &mut sampler);
            assert!(sample.radiance.max_element() <= 1.0 + 1e-5);
            assert!(sample.radiance.min_element() >= 0.0);
        }
    }

    #[test]
    fn test_diffuse_sphere_under_constant_sky_converges_to_albedo() {
        // A convex shape can never see itself, so one bounce reaches the sky.
        let albedo = Vec3::new(0.7, 0.5, 0.3);
        let scene = single_sphere(Material::diffuse(albedo, 1.0));
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let mut sampler = Sampler::from_state(7);

        let sample = trace_path(&query, &config(Sky::Constant { color: Vec3::ONE }), toward_sphere(), 8, &mut sampler);

        assert_eq!(sample.termination, Termination::Escaped);
        assert_eq!(sample.bounces, 1);
        assert!((sample.radiance - albedo).length() < 1e-5);
    }

    #[test]
    fn test_clear_glass_passes_sky_through() {
        let scene = single_sphere(Material::dielectric(Vec3::ONE, 1.5));
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let mut sampler = Sampler::from_state(8);

        for _ in 0..200 {
            let sample = trace_path(&query, &config(Sky::Constant { color: Vec3::ONE }), toward_sphere(), 64, &mut sampler);
            if sample.termination == Termination::Escaped {
                assert!((sample.radiance - Vec3::ONE).length() < 1e-4);
            }
        }
    }

    #[test]
    fn test_medium_boundaries_are_free() {
        // A fully transparent boundary (zero density) adds no medium.
        let boundary = Material::diffuse(Vec3::ONE, 1.0).with_volume_density(0.0);
        let scene = single_sphere(boundary);
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let sky = Vec3::new(0.3, 0.3, 0.3);
        let mut sampler = Sampler::from_state(9);

        let sample = trace_path(&query, &config(Sky::Constant { color: sky }), toward_sphere(), 1, &mut sampler);

        assert_eq!(sample.termination, Termination::Escaped);
        assert_eq!(sample.bounces, 0);
        assert!((sample.radiance - sky).length() < 1e-6);
    }

    #[test]
    fn test_dense_medium_scatters_inside() {
        let fog = Material::diffuse(Vec3::ONE, 1.0).with_volume_density(0.9).with_emission(0.5);
        let scene = single_sphere(fog);
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let mut sampler = Sampler::from_state(10);

        let mut scattered = 0;
        for _ in 0..500 {
            let sample = trace_path(&query, &config(Sky::Black), toward_sphere(), 32, &mut sampler);
            if sample.bounces > 0 {
                scattered += 1;
                // Glowing medium is the only light source.
                assert!(sample.radiance.x > 0.0);
            }
        }

        // Free path mean is ~1.1 against a chord of 2.
        assert!(scattered > 250, "{scattered}");
    }

    const FOG_DENSITY: f32 = 0.5;
    const FOG_EMISSION: f32 = 0.8;

    fn glowing_fog() -> Scene {
        single_sphere(
            Material::diffuse(Vec3::ONE, 1.0)
                .with_volume_density(FOG_DENSITY)
                .with_emission(FOG_EMISSION),
        )
    }

    /// The two uniforms a fog path draws for its first and second free path.
    /// Entering the fog draws nothing; a scatter draws a sphere direction.
    fn fog_draws(seed: u32) -> (f32, f32) {
        let mut replay = Sampler::from_state(seed);
        let first = replay.next_f32().max(LOG_FLOOR);
        replay.sample_sphere_direction();
        let second = replay.next_f32().max(LOG_FLOOR);
        (first, second)
    }

    fn free_path(u: f32) -> f32 {
        -u.ln() / FOG_DENSITY
    }

    #[test]
    fn test_medium_scatter_weights_emission_by_absorption() {
        let scene = glowing_fog();
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);

        // Chord through the fog is 2; pick a seed that scatters well inside.
        let seed = (1u32..10_000)
            .find(|&s| free_path(fog_draws(s).0) < 1.9)
            .expect("some seed scatters inside the fog");
        let (u, _) = fog_draws(seed);

        let mut sampler = Sampler::from_state(seed);
        let sample = trace_path(&query, &config(Sky::Black), toward_sphere(), 1, &mut sampler);

        // Transmittance over the sampled free path is exactly the drawn uniform.
        assert_eq!(sample.termination, Termination::BounceLimit);
        assert_eq!(sample.bounces, 1);
        let expected = FOG_EMISSION * (1.0 - u);
        assert!((sample.radiance - Vec3::splat(expected)).length() < 1e-4, "{:?} vs {expected}", sample.radiance);
    }

    #[test]
    fn test_medium_scatter_attenuates_later_emission() {
        let scene = glowing_fog();
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);

        // First scatter lands near the center, at least 0.8 from the boundary in
        // every direction; the second free path is shorter than that.
        let seed = (1u32..100_000)
            .find(|&s| {
                let (first, second) = fog_draws(s);
                (0.8..=1.2).contains(&free_path(first)) && free_path(second) < 0.7
            })
            .expect("some seed scatters twice inside the fog");
        let (u1, u2) = fog_draws(seed);

        let mut sampler = Sampler::from_state(seed);
        let sample = trace_path(&query, &config(Sky::Black), toward_sphere(), 2, &mut sampler);

        assert_eq!(sample.termination, Termination::BounceLimit);
        assert_eq!(sample.bounces, 2);
        let expected = FOG_EMISSION * (1.0 - u1) + u1 * FOG_EMISSION * (1.0 - u2);
        assert!((sample.radiance - Vec3::splat(expected)).length() < 1e-4, "{:?} vs {expected}", sample.radiance);
    }

    #[test]
    fn test_crossing_limit_ends_path() {
        let boundary = Material::diffuse(Vec3::ONE, 1.0).with_volume_density(0.0);
        let scene = single_sphere(boundary);
        let query = SceneQuery::new(&scene, DEFAULT_BVH_THRESHOLD);
        let config = RenderConfig {
            max_boundary_crossings: 1,
            sky: Sky::Constant { color: Vec3::ONE },
            ..RenderConfig::default()
        };
        let mut sampler = Sampler::from_state(11);

        let sample = trace_path(&query, &config, toward_sphere(), 8, &mut sampler);
        assert_eq!(sample.termination, Termination::CrossingLimit);
    }

    #[test]
    fn test_medium_snaps_to_vacuum() {
        let material = Material::DEFAULT.with_volume_density(0.3).with_emission(2.0);
        let mut medium = Medium::default();

        for _ in 0..50 {
            medium.cross(&material, true, 1e-4);
            medium.cross(&material, false, 1e-4);
            assert_eq!(medium, Medium::default());
        }

        medium.cross(&material, true, 1e-4);
        assert!((medium.density - 0.3).abs() < 1e-6);
        assert!((medium.radiance - 2.0).abs() < 1e-6);
    }
}
