/// A range of accepted ray parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if x is within [min, max).
    ///
    /// This is the acceptance test for a candidate hit distance: at least the
    /// self-intersection epsilon, strictly closer than the best hit so far.
    pub fn admits(&self, x: f32) -> bool {
        self.min <= x && x < self.max
    }

    /// Returns a copy with `max` lowered to `max` if that is tighter.
    pub fn clamp_max(&self, max: f32) -> Interval {
        Interval::new(self.min, self.max.min(max))
    }
}
