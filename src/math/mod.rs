pub mod arc_2d;
pub mod distance_2d;
pub mod intersect_2d;
pub mod vector_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global floor for degeneracy checks (zero-length vectors, parallel lines).
pub const TOLERANCE: f64 = 1e-12;

/// Caller-configurable tolerance for coincidence and tangency decisions.
///
/// The effective epsilon at a given coordinate magnitude is
/// `absolute + relative * magnitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute part of the epsilon.
    pub absolute: f64,
    /// Part of the epsilon proportional to the magnitude of the coordinates involved.
    pub relative: f64,
}

impl Tolerance {
    /// Creates a new tolerance.
    #[must_use]
    pub fn new(absolute: f64, relative: f64) -> Self {
        Self { absolute, relative }
    }

    /// Returns the epsilon to use for quantities of size `magnitude`.
    #[must_use]
    pub fn eps(&self, magnitude: f64) -> f64 {
        self.absolute + self.relative * magnitude.abs()
    }

    /// Epsilon for a decision taken at point `p`.
    #[must_use]
    pub fn eps_at(&self, p: &Point2) -> f64 {
        self.eps(p.coords.amax())
    }

    /// Returns whether two points coincide within this tolerance.
    #[must_use]
    pub fn points_coincide(&self, a: &Point2, b: &Point2) -> bool {
        let scale = a.coords.amax().max(b.coords.amax());
        (a - b).norm() <= self.eps(scale)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            absolute: 1e-9,
            relative: 1e-9,
        }
    }
}
