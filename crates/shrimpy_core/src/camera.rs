//! Camera and per-frame uniform records.

use bytemuck::{Pod, Zeroable};
use shrimpy_math::Vec3;

/// World-space up vector used to derive the camera basis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Thin-lens camera in upload layout (64 bytes).
///
/// Immutable for the duration of a frame. `direction` is expected to be
/// normalized; the builder methods keep it that way.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Camera {
    /// Sensor width in world units
    pub width: f32,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Distance from the camera to the plane of perfect focus
    pub focus_distance: f32,
    /// Lens aperture diameter; 0 disables depth of field
    pub aperture: f32,
    /// Anti-aliasing jitter magnitude, in normalized screen units
    pub diverge_strength: f32,
    pub max_ray_bounces: u32,
    _pad0: [u32; 2],
    pub position: Vec3,
    _pad1: u32,
    pub direction: Vec3,
    _pad2: u32,
}

impl Camera {
    /// Create a camera with default settings, looking down +Z.
    pub fn new() -> Self {
        Self {
            width: 2.5,
            fov: 75.0_f32.to_radians(),
            focus_distance: 2.0,
            aperture: 0.02,
            diverge_strength: 0.004,
            max_ray_bounces: 100,
            _pad0: [0; 2],
            position: Vec3::ZERO,
            _pad1: 0,
            direction: Vec3::Z,
            _pad2: 0,
        }
    }

    /// Set camera position and viewing direction.
    pub fn with_position(mut self, position: Vec3, direction: Vec3) -> Self {
        self.position = position;
        self.direction = direction.try_normalize().unwrap_or(Vec3::Z);
        self
    }

    /// Point the camera at a target.
    pub fn looking_at(self, position: Vec3, target: Vec3) -> Self {
        self.with_position(position, target - position)
    }

    /// Set lens settings.
    pub fn with_lens(mut self, fov_degrees: f32, focus_distance: f32, aperture: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self.focus_distance = focus_distance;
        self.aperture = aperture.max(0.0);
        self
    }

    /// Set sensor width and anti-aliasing jitter.
    pub fn with_sensor(mut self, width: f32, diverge_strength: f32) -> Self {
        self.width = width;
        self.diverge_strength = diverge_strength.max(0.0);
        self
    }

    /// Set the bounce budget for each path.
    pub fn with_max_bounces(mut self, max_ray_bounces: u32) -> Self {
        self.max_ray_bounces = max_ray_bounces;
        self
    }

    /// Camera-space right axis.
    ///
    /// Degenerate when `direction` is parallel to [`WORLD_UP`]; callers are
    /// expected not to look straight up or down.
    pub fn right(&self) -> Vec3 {
        -self.direction.cross(WORLD_UP).normalize()
    }

    /// Camera-space up axis.
    pub fn up(&self) -> Vec3 {
        self.direction.cross(self.right()).normalize()
    }

    /// Move along the view direction.
    pub fn move_forward(&mut self, amount: f32) {
        self.position += self.direction * amount;
    }

    /// Move along the camera's right axis.
    pub fn move_right(&mut self, amount: f32) {
        self.position += self.right() * amount;
    }

    /// Move along the camera's up axis.
    pub fn move_up(&mut self, amount: f32) {
        self.position += self.up() * amount;
    }

    /// Turn the view toward the right axis (negative turns left).
    ///
    /// `amount` is the tangent of the turn angle.
    pub fn pan(&mut self, amount: f32) {
        let turned = self.direction + self.right() * amount;
        self.direction = turned.try_normalize().unwrap_or(self.direction);
    }

    /// Turn the view toward the up axis (negative looks down).
    pub fn tilt(&mut self, amount: f32) {
        let turned = self.direction + self.up() * amount;
        self.direction = turned.try_normalize().unwrap_or(self.direction);
    }

    /// Distance from the pinhole to the sensor plane.
    pub fn focal_length(&self) -> f32 {
        self.width * 0.5 / (self.fov * 0.5).tan()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame configuration shared by every pixel invocation (96 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
    pub elapsed_seconds: f32,
    /// 1 on the first frame, incremented every frame.
    pub frame_count: u32,
    pub gamma_correction: f32,
    _pad0: [u32; 3],
}

impl FrameUniforms {
    /// Uniforms for the frame before the first one; call
    /// [`FrameUniforms::advance`] before rendering.
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        Self {
            camera,
            width,
            height,
            elapsed_seconds: 0.0,
            frame_count: 0,
            gamma_correction: 2.2,
            _pad0: [0; 3],
        }
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma_correction = gamma;
        self
    }

    /// Step to the next frame.
    pub fn advance(&mut self, elapsed_seconds: f32) {
        self.elapsed_seconds = elapsed_seconds;
        self.frame_count += 1;
    }

    /// Restart accumulation, e.g. after the camera moved.
    pub fn reset(&mut self) {
        self.frame_count = 0;
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts() {
        assert_eq!(std::mem::size_of::<Camera>(), 64);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 96);
    }

    #[test]
    fn test_default_basis() {
        let camera = Camera::new();

        assert!((camera.right() - Vec3::X).length() < 1e-6);
        assert!((camera.up() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let camera = Camera::new().looking_at(Vec3::new(3.0, 1.0, -2.0), Vec3::new(0.0, 0.5, 4.0));
        let (f, r, u) = (camera.direction, camera.right(), camera.up());

        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!((u.length() - 1.0).abs() < 1e-5);
        assert!(f.dot(r).abs() < 1e-5);
        assert!(f.dot(u).abs() < 1e-5);
        assert!(r.dot(u).abs() < 1e-5);
        assert!(u.y > 0.0);
    }

    #[test]
    fn test_focal_length() {
        let camera = Camera::new().with_sensor(2.0, 0.0).with_lens(90.0, 1.0, 0.0);
        assert!((camera.focal_length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_move_along_basis() {
        let mut camera = Camera::new().looking_at(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        let (f, r, u) = (camera.direction, camera.right(), camera.up());

        camera.move_forward(2.0);
        camera.move_right(-1.0);
        camera.move_up(0.5);

        let expected = f * 2.0 - r + u * 0.5;
        assert!((camera.position - expected).length() < 1e-5);
        // Moving never turns the camera.
        assert_eq!(camera.direction, f);
    }

    #[test]
    fn test_pan_and_tilt_turn_toward_axis() {
        let mut camera = Camera::new();

        camera.pan(1.0);
        assert!((camera.direction.length() - 1.0).abs() < 1e-6);
        assert!((camera.direction - Vec3::new(1.0, 0.0, 1.0).normalize()).length() < 1e-5);

        let before = camera.direction;
        camera.tilt(-0.5);
        assert!((camera.direction.length() - 1.0).abs() < 1e-6);
        assert!(camera.direction.y < 0.0);
        assert!((camera.direction.dot(before) - 1.0 / 1.25_f32.sqrt()).abs() < 1e-5);
        assert_eq!(camera.position, Vec3::ZERO);
    }

    #[test]
    fn test_uniforms_advance() {
        let mut uniforms = FrameUniforms::new(Camera::new(), 800, 600);
        assert_eq!(uniforms.frame_count, 0);

        uniforms.advance(0.016);
        assert_eq!(uniforms.frame_count, 1);
        assert_eq!(uniforms.elapsed_seconds, 0.016);

        uniforms.advance(0.032);
        assert_eq!(uniforms.frame_count, 2);

        uniforms.reset();
        assert_eq!(uniforms.frame_count, 0);
        assert_eq!(uniforms.pixel_count(), 480_000);
    }
}
