//! Primary ray generation for the thin-lens camera.

use serde::{Deserialize, Serialize};
use shrimpy_core::Camera;
use shrimpy_math::{Ray, UVec2, Vec2};

use crate::sampler::Sampler;

/// Shape of the lens aperture, which shows up in out-of-focus highlights.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Bokeh {
    /// Round aperture
    #[default]
    Disk,
    /// Regular polygon aperture with the given number of blades
    Polygon { sides: u32 },
}

impl Bokeh {
    /// Sample a point on the unit aperture.
    pub fn sample(&self, sampler: &mut Sampler) -> Vec2 {
        match *self {
            Bokeh::Disk => sampler.sample_disk(),
            Bokeh::Polygon { sides } => sampler.sample_regular_polygon(sides),
        }
    }
}

/// Map a pixel center to normalized screen coordinates.
///
/// Vertical range is [-1, 1] with +1 at the top row; horizontal is scaled
/// by the aspect ratio.
pub fn pixel_to_screen(pixel: UVec2, resolution: UVec2) -> Vec2 {
    let size = resolution.max(UVec2::ONE).as_vec2();
    let aspect = size.x / size.y;
    let center = pixel.as_vec2() + 0.5;

    Vec2::new(
        (center.x / size.x * 2.0 - 1.0) * aspect,
        1.0 - center.y / size.y * 2.0,
    )
}

/// Generate a primary ray through `pixel`.
///
/// The origin is jittered across the aperture and the screen position by
/// `diverge_strength`; every lens sample for the same screen position
/// converges on one point at `focus_distance`.
pub fn generate_ray(
    camera: &Camera,
    pixel: UVec2,
    resolution: UVec2,
    bokeh: Bokeh,
    sampler: &mut Sampler,
) -> Ray {
    let right = camera.right();
    let up = camera.up();

    let lens = bokeh.sample(sampler) * camera.aperture * 0.5;
    let origin = camera.position + right * lens.x + up * lens.y;

    let jitter = sampler.sample_disk() * camera.diverge_strength;
    let screen = pixel_to_screen(pixel, resolution) + jitter;
    let sensor = screen * camera.width * 0.5;

    let look = (camera.direction * camera.focal_length() + right * sensor.x + up * sensor.y).normalize();
    let focus_point = camera.position + look * camera.focus_distance;

    Ray::normalized(origin, focus_point - origin)
}
