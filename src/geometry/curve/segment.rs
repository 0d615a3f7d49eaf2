use crate::geometry::Line;
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::intersect_2d::line_segment_intersect_2d;
use crate::math::{Point2, Vector2};

use super::Curve;

/// A straight line segment from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start: Point2,
    end: Point2,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Returns the same segment shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector2) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

impl Curve for Segment {
    fn start(&self) -> Point2 {
        self.start
    }

    fn end(&self) -> Point2 {
        self.end
    }

    fn intersect_line(&self, line: &Line, eps: f64) -> Vec<f64> {
        line_segment_intersect_2d(line.origin(), line.direction(), &self.start, &self.end, eps)
            .map(|(s, _)| vec![s])
            .unwrap_or_default()
    }

    fn tangent_at(&self, _p: &Point2) -> Vector2 {
        let d = self.end - self.start;
        let len = d.norm();
        if len > 0.0 {
            d / len
        } else {
            Vector2::zeros()
        }
    }

    fn distance_to(&self, p: &Point2) -> f64 {
        point_to_segment_dist(p, &self.start, &self.end)
    }

    fn bulge_area(&self) -> f64 {
        0.0
    }

    fn tessellate(&self, _tolerance: f64) -> Vec<Point2> {
        vec![self.end]
    }
}
