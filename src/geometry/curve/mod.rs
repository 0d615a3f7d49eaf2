mod arc;
mod segment;

pub use arc::Arc;
pub use segment::Segment;

use crate::geometry::Line;
use crate::math::vector_2d::cross;
use crate::math::{Point2, Vector2};

/// Trait for the bounded 2D curves a region boundary is made of.
pub trait Curve {
    /// First point of the curve in travel order.
    fn start(&self) -> Point2;

    /// Last point of the curve in travel order.
    fn end(&self) -> Point2;

    /// Signed distances along `line` at which it crosses this curve,
    /// in increasing order. `eps` is the length slack used at the curve
    /// ends and for tangency decisions.
    fn intersect_line(&self, line: &Line, eps: f64) -> Vec<f64>;

    /// Unit direction of travel at `p`, assumed to lie on the curve.
    fn tangent_at(&self, p: &Point2) -> Vector2;

    /// Shortest distance from `p` to the curve.
    fn distance_to(&self, p: &Point2) -> f64;

    /// Signed area swept between the curve and its chord (zero for a segment).
    fn bulge_area(&self) -> f64;

    /// Polyline approximation: the points after `start()`, ending with `end()`.
    fn tessellate(&self, tolerance: f64) -> Vec<Point2>;

    /// Contribution of this curve to the signed area of a closed boundary.
    fn area_term(&self) -> f64 {
        let (a, b) = (self.start(), self.end());
        0.5 * cross(&a.coords, &b.coords) + self.bulge_area()
    }
}

/// A curve that can appear in a region boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryCurve {
    /// A straight line segment.
    Segment(Segment),
    /// A circular arc.
    Arc(Arc),
}

impl BoundaryCurve {
    /// Returns the same curve shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector2) -> Self {
        match self {
            Self::Segment(s) => Self::Segment(s.translated(offset)),
            Self::Arc(a) => Self::Arc(a.translated(offset)),
        }
    }

    fn inner(&self) -> &dyn Curve {
        match self {
            Self::Segment(s) => s,
            Self::Arc(a) => a,
        }
    }
}

impl Curve for BoundaryCurve {
    fn start(&self) -> Point2 {
        self.inner().start()
    }

    fn end(&self) -> Point2 {
        self.inner().end()
    }

    fn intersect_line(&self, line: &Line, eps: f64) -> Vec<f64> {
        self.inner().intersect_line(line, eps)
    }

    fn tangent_at(&self, p: &Point2) -> Vector2 {
        self.inner().tangent_at(p)
    }

    fn distance_to(&self, p: &Point2) -> f64 {
        self.inner().distance_to(p)
    }

    fn bulge_area(&self) -> f64 {
        self.inner().bulge_area()
    }

    fn tessellate(&self, tolerance: f64) -> Vec<Point2> {
        self.inner().tessellate(tolerance)
    }
}
