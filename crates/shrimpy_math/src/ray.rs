use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// The direction is not required to be unit length; construction sites that
/// need a normalized direction use [`Ray::normalized`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray whose direction is normalized.
    #[inline]
    pub fn normalized(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction.normalize())
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Move the origin `distance` units along the direction.
    ///
    /// Used to step a ray just past a surface it has crossed.
    #[inline]
    pub fn advanced(&self, distance: f32) -> Self {
        Self::new(self.at(distance), self.direction)
    }
}
