use crate::error::{GeometryError, Result};
use crate::geometry::Line;
use crate::math::arc_2d::{
    arc_from_end_tangent, arc_point_at, arc_segment_area, arc_subdivision_count,
    arc_tangent_at_point,
};
use crate::math::distance_2d::point_to_arc_dist;
use crate::math::intersect_2d::line_arc_intersect_2d;
use crate::math::{Point2, Vector2, TOLERANCE};

use super::Curve;

/// A circular arc in the plane.
///
/// Stored in center-radius-angle form with a signed sweep
/// (positive = counter-clockwise). The endpoints are kept verbatim so
/// that consecutive boundary curves join exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    start: Point2,
    end: Point2,
    center: Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
}

impl Arc {
    /// Creates the arc from `start` to `end` whose direction of travel at
    /// `end` is `end_tangent`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroVector` for a zero tangent, and
    /// `GeometryError::Degenerate` when the endpoints coincide or the
    /// tangent is parallel to the chord.
    pub fn from_end_tangent(start: Point2, end: Point2, end_tangent: &Vector2) -> Result<Self> {
        if end_tangent.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("arc endpoints coincide".into()).into());
        }
        let (center, radius, start_angle, sweep) = arc_from_end_tangent(&start, &end, end_tangent)
            .ok_or_else(|| {
                GeometryError::Degenerate("arc tangent is parallel to its chord".into())
            })?;
        Ok(Self {
            start,
            end,
            center,
            radius,
            start_angle,
            sweep,
        })
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Signed sweep angle in radians.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    /// Returns whether the arc turns counter-clockwise.
    #[must_use]
    pub fn is_ccw(&self) -> bool {
        self.sweep > 0.0
    }

    /// Returns the same arc shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector2) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            center: self.center + offset,
            ..self.clone()
        }
    }
}

impl Curve for Arc {
    fn start(&self) -> Point2 {
        self.start
    }

    fn end(&self) -> Point2 {
        self.end
    }

    fn intersect_line(&self, line: &Line, eps: f64) -> Vec<f64> {
        line_arc_intersect_2d(
            line.origin(),
            line.direction(),
            &self.center,
            self.radius,
            self.start_angle,
            self.sweep,
            eps,
        )
        .into_iter()
        .map(|(s, _)| s)
        .collect()
    }

    fn tangent_at(&self, p: &Point2) -> Vector2 {
        arc_tangent_at_point(&self.center, self.sweep, p)
    }

    fn distance_to(&self, p: &Point2) -> f64 {
        point_to_arc_dist(p, &self.center, self.radius, self.start_angle, self.sweep)
    }

    fn bulge_area(&self) -> f64 {
        arc_segment_area(self.radius, self.sweep)
    }

    fn tessellate(&self, tolerance: f64) -> Vec<Point2> {
        let n = arc_subdivision_count(self.radius, self.sweep.abs(), tolerance);
        let mut points: Vec<Point2> = (1..n)
            .map(|j| {
                let t = f64::from(j) / f64::from(n);
                arc_point_at(&self.center, self.radius, self.start_angle, self.sweep, t)
            })
            .collect();
        points.push(self.end);
        points
    }
}
