use crate::error::Result;
use crate::math::distance_2d::point_to_line_dist;
use crate::math::intersect_2d::line_line_intersect_2d;
use crate::math::vector_2d::normalize;
use crate::math::{Point2, Vector2};

/// An infinite line defined by an origin point and a unit direction vector.
///
/// The parametric form is: `P(s) = p + s * u`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    p: Point2,
    u: Vector2,
}

impl Line {
    /// Creates a new line from an origin and direction.
    ///
    /// The direction is normalized, so `Line::new(p, Vector2::new(108.0, 0.0))`
    /// and `Line::new(p, Vector2::new(1.0, 0.0))` are the same line.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(p: Point2, u: Vector2) -> Result<Self> {
        Ok(Self { p, u: normalize(&u)? })
    }

    /// Returns the origin point of the line.
    #[must_use]
    pub fn origin(&self) -> &Point2 {
        &self.p
    }

    /// Returns the unit direction vector of the line.
    #[must_use]
    pub fn direction(&self) -> &Vector2 {
        &self.u
    }

    /// Point at signed distance `s` from the origin.
    #[must_use]
    pub fn point_at(&self, s: f64) -> Point2 {
        self.p + self.u * s
    }

    /// Returns the same line with its origin shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector2) -> Self {
        Self {
            p: self.p + offset,
            u: self.u,
        }
    }

    /// Distance from `q` to this (infinite) line.
    #[must_use]
    pub fn distance_to(&self, q: &Point2) -> f64 {
        point_to_line_dist(q, &self.p, &self.u)
    }

    /// Crossing point with another line, or `None` if they are parallel.
    #[must_use]
    pub fn intersect(&self, other: &Line) -> Option<Point2> {
        line_line_intersect_2d(&self.p, &self.u, &other.p, &other.u).map(|(s, _)| self.point_at(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn direction_is_normalized() {
        let line = Line::new(Point2::new(10.0, 50.0), Vector2::new(108.0, 0.0)).unwrap();
        assert_relative_eq!(*line.direction(), Vector2::new(1.0, 0.0));
        assert_relative_eq!(line.point_at(3.0), Point2::new(13.0, 50.0));
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Line::new(Point2::origin(), Vector2::zeros()).is_err());
    }

    #[test]
    fn crossing_of_two_lines() {
        let a = Line::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 1.0)).unwrap();
        let b = Line::new(Point2::new(2.0, 0.0), Vector2::new(0.0, 1.0)).unwrap();
        assert_relative_eq!(a.intersect(&b).unwrap(), Point2::new(2.0, 2.0), epsilon = 1e-12);
        let c = a.translated(&Vector2::new(0.0, 1.0));
        assert!(a.intersect(&c).is_none());
        assert_relative_eq!(a.distance_to(c.origin()), 0.5_f64.sqrt(), epsilon = 1e-12);
    }
}
