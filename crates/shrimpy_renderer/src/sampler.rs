//! Per-invocation random sampling.
//!
//! Every pixel invocation owns one [`Sampler`], seeded from its pixel
//! coordinate, the elapsed time and the frame counter. There is no shared
//! RNG state between pixels, so invocations can run in any order and in
//! parallel.

use std::f32::consts::TAU;

use shrimpy_math::{UVec2, Vec2, Vec3};

/// Floor applied to uniforms before taking a logarithm.
pub const LOG_FLOOR: f32 = 1e-6;

/// Replacement for an all-zero seed, which is a fixed point of xorshift.
const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

/// Bob Jenkins' one-at-a-time mix of a single 32-bit word.
#[inline]
pub fn jenkins_hash(mut x: u32) -> u32 {
    x = x.wrapping_add(x << 10);
    x ^= x >> 6;
    x = x.wrapping_add(x << 3);
    x ^= x >> 11;
    x = x.wrapping_add(x << 15);
    x
}

/// Xorshift32 generator with derived distributions.
#[derive(Debug, Clone)]
pub struct Sampler {
    state: u32,
    /// Second Box-Muller value, returned by the next `next_normal` call.
    spare_normal: Option<f32>,
}

impl Sampler {
    /// Start from a raw state word.
    pub fn from_state(state: u32) -> Self {
        Self {
            state: if state == 0 { ZERO_SEED_REPLACEMENT } else { state },
            spare_normal: None,
        }
    }

    /// Seed for one pixel of one frame.
    ///
    /// Spatial, temporal and frame terms are each hashed and combined so
    /// neighbouring pixels and consecutive frames decorrelate even though
    /// the inputs only differ by one.
    pub fn for_pixel(pixel: UVec2, width: u32, elapsed_seconds: f32, frame_count: u32) -> Self {
        let spatial = pixel.x.wrapping_add(pixel.y.wrapping_mul(width));
        let temporal = (elapsed_seconds * 1000.0) as u32;

        let seed = jenkins_hash(spatial) ^ jenkins_hash(temporal) ^ jenkins_hash(frame_count);
        Self::from_state(jenkins_hash(seed))
    }

    /// Next raw 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in [0, 1).
    ///
    /// The top 23 bits become the mantissa of a float in [1, 2).
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        let bits = (self.next_u32() >> 9) | 0x3F80_0000;
        f32::from_bits(bits) - 1.0
    }

    /// Standard normal value (Box-Muller, second value cached).
    pub fn next_normal(&mut self) -> f32 {
        if let Some(z) = self.spare_normal.take() {
            return z;
        }

        let u1 = self.next_f32().max(LOG_FLOOR);
        let u2 = self.next_f32();
        let r = (-2.0 * u1.ln()).sqrt();
        let (sin, cos) = (TAU * u2).sin_cos();

        self.spare_normal = Some(r * sin);
        r * cos
    }

    /// Uniform point on the unit disk.
    pub fn sample_disk(&mut self) -> Vec2 {
        let angle = self.next_f32() * TAU;
        let (sin, cos) = angle.sin_cos();
        Vec2::new(cos, sin) * self.next_f32().sqrt()
    }

    /// Uniform direction on the unit sphere.
    pub fn sample_sphere_direction(&mut self) -> Vec3 {
        let v = Vec3::new(self.next_normal(), self.next_normal(), self.next_normal());
        v.try_normalize().unwrap_or(Vec3::Y)
    }

    /// Point inside a regular `sides`-gon inscribed in the unit circle,
    /// with a corner on +X. Fewer than three sides samples the disk.
    pub fn sample_regular_polygon(&mut self, sides: u32) -> Vec2 {
        if sides < 3 {
            return self.sample_disk();
        }

        let wedge = TAU / sides as f32;
        let angle = self.next_f32() * TAU;
        let position = angle / wedge;
        let corner = position.floor();
        let t = position - corner;

        let a = Vec2::from_angle(corner * wedge);
        let b = Vec2::from_angle((corner + 1.0) * wedge);
        a.lerp(b, t) * self.next_f32().sqrt()
    }
}
