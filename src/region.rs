/// Closed 2D regions bounded by straight segments and circular arcs.
use crate::error::{GeometryError, OpticsError, RegionError, Result};
use crate::geometry::{Arc, BoundaryCurve, Curve, Line, Segment};
use crate::math::arc_2d::{arc_from_end_tangent, tangent_follows_chord};
use crate::math::vector_2d::{left_normal, right_normal, rotate};
use crate::math::{Point2, Tolerance, Vector2, TOLERANCE};

/// One crossing of a line with a region boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHit {
    /// Index of the boundary curve that was hit, in insertion order.
    pub curve: usize,
    /// The crossing point.
    pub point: Point2,
    /// Distance from the line origin along its direction.
    pub distance: f64,
}

/// Position of a point relative to a closed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Outside,
    OnBoundary,
}

/// A closed boundary with a single refractive index on its interior.
///
/// Built incrementally with [`Region::start`], [`Region::add_line`],
/// [`Region::add_arc`] and frozen by [`Region::close`]; queries fail with
/// [`RegionError::Unclosed`] until then.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    n: f64,
    first: Option<Point2>,
    cursor: Option<Point2>,
    curves: Vec<BoundaryCurve>,
    closed: bool,
    ccw: bool,
}

impl Region {
    /// Creates an empty region with interior index `n`.
    ///
    /// # Errors
    ///
    /// Returns `OpticsError::InvalidParameter` if `n` is not finite and positive.
    pub fn new(n: f64) -> Result<Self> {
        check_index(n)?;
        Ok(Self {
            n,
            first: None,
            cursor: None,
            curves: Vec::new(),
            closed: false,
            ccw: true,
        })
    }

    /// Refractive index of the interior.
    #[must_use]
    pub fn index(&self) -> f64 {
        self.n
    }

    /// Changes the refractive index of the interior.
    ///
    /// # Errors
    ///
    /// Returns `OpticsError::InvalidParameter` if `n` is not finite and positive.
    pub fn set_index(&mut self, n: f64) -> Result<()> {
        check_index(n)?;
        self.n = n;
        Ok(())
    }

    /// Begins a new boundary at `point`, discarding any open one.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::AlreadyClosed` on a closed region.
    pub fn start(&mut self, point: Point2) -> Result<()> {
        self.check_open()?;
        self.first = Some(point);
        self.cursor = Some(point);
        self.curves.clear();
        Ok(())
    }

    /// Appends a straight segment from the current endpoint to `point`.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::NotStarted`/`AlreadyClosed` in the wrong state,
    /// or `GeometryError::Degenerate` if `point` equals the current endpoint.
    pub fn add_line(&mut self, point: Point2) -> Result<()> {
        let from = self.open_cursor()?;
        if (point - from).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("zero-length boundary segment".into()).into());
        }
        self.curves
            .push(BoundaryCurve::Segment(Segment::new(from, point)));
        self.cursor = Some(point);
        Ok(())
    }

    /// Appends a circular arc ending at `point`, arriving with direction
    /// `tangent`. A tangent pointing straight along the chord yields a
    /// plain segment.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::NotStarted`/`AlreadyClosed` in the wrong state,
    /// `GeometryError::ZeroVector` for a zero tangent, or
    /// `GeometryError::Degenerate` when the arc is ill-defined.
    pub fn add_arc(&mut self, point: Point2, tangent: Vector2) -> Result<()> {
        let from = self.open_cursor()?;
        let chord = point - from;
        if tangent.norm() >= TOLERANCE
            && chord.norm() >= TOLERANCE
            && arc_from_end_tangent(&from, &point, &tangent).is_none()
            && tangent_follows_chord(&chord, &tangent)
        {
            return self.add_line(point);
        }
        let arc = Arc::from_end_tangent(from, point, &tangent)?;
        self.curves.push(BoundaryCurve::Arc(arc));
        self.cursor = Some(point);
        Ok(())
    }

    /// Closes the boundary with a straight segment back to the start point
    /// (unless the current endpoint already coincides with it) and freezes
    /// it for queries.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Unclosed` if the closed boundary would have
    /// fewer than 2 curves, and `GeometryError::Degenerate` if it would
    /// enclose no area. The region is left unchanged on error.
    pub fn close(&mut self) -> Result<()> {
        let from = self.open_cursor()?;
        let first = self.first.ok_or(RegionError::NotStarted)?;

        let mut curves = self.curves.clone();
        if !Tolerance::default().points_coincide(&from, &first) {
            curves.push(BoundaryCurve::Segment(Segment::new(from, first)));
        }
        if curves.len() < 2 {
            return Err(RegionError::Unclosed {
                segments: curves.len(),
            }
            .into());
        }

        let area: f64 = curves.iter().map(Curve::area_term).sum();
        let scale = curves
            .iter()
            .map(|c| (c.end() - c.start()).norm())
            .fold(0.0, f64::max);
        if area.abs() <= TOLERANCE * scale * scale {
            return Err(GeometryError::Degenerate("region encloses no area".into()).into());
        }

        self.curves = curves;
        self.cursor = Some(first);
        self.ccw = area > 0.0;
        self.closed = true;
        Ok(())
    }

    /// Returns whether the boundary has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Boundary curves in insertion order.
    #[must_use]
    pub fn curves(&self) -> &[BoundaryCurve] {
        &self.curves
    }

    /// Returns whether the closed boundary runs counter-clockwise.
    #[must_use]
    pub fn is_ccw(&self) -> bool {
        self.ccw
    }

    /// Signed enclosed area (positive for a counter-clockwise boundary).
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Unclosed` before [`Region::close`].
    pub fn signed_area(&self) -> Result<f64> {
        self.check_closed()?;
        Ok(self.curves.iter().map(Curve::area_term).sum())
    }

    /// All boundary crossings of the forward half-line from `line`, sorted
    /// by increasing distance.
    ///
    /// Crossings closer than the tolerance to the line origin are skipped.
    /// Crossings at the same distance (within tolerance) are ordered by
    /// curve insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Unclosed` before [`Region::close`].
    pub fn intersect(&self, line: &Line, tol: &Tolerance) -> Result<Vec<BoundaryHit>> {
        self.check_closed()?;
        let eps = tol.eps_at(line.origin());
        let mut hits: Vec<BoundaryHit> = self
            .curves
            .iter()
            .enumerate()
            .flat_map(|(i, curve)| {
                curve
                    .intersect_line(line, eps)
                    .into_iter()
                    .filter(move |&s| s > eps)
                    .map(move |s| BoundaryHit {
                        curve: i,
                        point: line.point_at(s),
                        distance: s,
                    })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.curve.cmp(&b.curve)));
        order_ties(&mut hits, eps);
        Ok(hits)
    }

    /// Outward unit normal of curve `curve` at `point`.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Unclosed` before [`Region::close`], or
    /// `OpticsError::InvalidParameter` for an unknown curve index.
    pub fn outward_normal(&self, curve: usize, point: &Point2) -> Result<Vector2> {
        self.check_closed()?;
        let c = self.curves.get(curve).ok_or_else(|| {
            OpticsError::InvalidParameter(format!("no boundary curve {curve}"))
        })?;
        let t = c.tangent_at(point);
        Ok(if self.ccw {
            right_normal(&t)
        } else {
            left_normal(&t)
        })
    }

    /// Shortest distance from `p` to the boundary.
    #[must_use]
    pub fn distance_to_boundary(&self, p: &Point2) -> f64 {
        self.curves
            .iter()
            .map(|c| c.distance_to(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Locates `p` relative to the region.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Unclosed` before [`Region::close`].
    pub fn classify(&self, p: &Point2, tol: &Tolerance) -> Result<Containment> {
        self.check_closed()?;
        let eps = tol.eps_at(p);
        if self.distance_to_boundary(p) <= eps {
            return Ok(Containment::OnBoundary);
        }

        // Crossing parity along a probe direction; a probe that grazes a
        // curve or passes through a joint is ambiguous, so rotate and retry.
        let mut dir = Vector2::new(0.8, 0.6);
        for _ in 0..16 {
            if let Some(inside) = self.crossing_parity(p, &dir, tol)? {
                return Ok(if inside {
                    Containment::Inside
                } else {
                    Containment::Outside
                });
            }
            dir = rotate(&dir, 0.377);
        }
        Ok(Containment::OnBoundary)
    }

    /// Returns whether `p` lies strictly inside the region.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Unclosed` before [`Region::close`].
    pub fn contains(&self, p: &Point2, tol: &Tolerance) -> Result<bool> {
        Ok(self.classify(p, tol)? == Containment::Inside)
    }

    /// Shifts the whole region by `offset`.
    pub fn translate(&mut self, offset: &Vector2) {
        self.first = self.first.map(|p| p + offset);
        self.cursor = self.cursor.map(|p| p + offset);
        for curve in &mut self.curves {
            *curve = curve.translated(offset);
        }
    }

    /// Closed polyline approximation of the boundary for drawing; the
    /// first point is repeated at the end.
    #[must_use]
    pub fn outline(&self, tolerance: f64) -> Vec<Point2> {
        let Some(first) = self.curves.first() else {
            return self.first.into_iter().collect();
        };
        let mut points = vec![first.start()];
        for curve in &self.curves {
            points.extend(curve.tessellate(tolerance));
        }
        points
    }

    fn crossing_parity(&self, p: &Point2, dir: &Vector2, tol: &Tolerance) -> Result<Option<bool>> {
        let probe = Line::new(*p, *dir)?;
        let hits = self.intersect(&probe, tol)?;
        for hit in &hits {
            let eps = tol.eps_at(&hit.point).max(TOLERANCE);
            let curve = &self.curves[hit.curve];
            let at_joint = (hit.point - curve.start()).norm() <= eps * 1e3
                || (hit.point - curve.end()).norm() <= eps * 1e3;
            let grazing = curve.tangent_at(&hit.point).dot(probe.direction()).abs() > 1.0 - 1e-9;
            if at_joint || grazing {
                return Ok(None);
            }
        }
        Ok(Some(hits.len() % 2 == 1))
    }

    fn open_cursor(&self) -> Result<Point2> {
        self.check_open()?;
        Ok(self.cursor.ok_or(RegionError::NotStarted)?)
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(RegionError::AlreadyClosed.into());
        }
        Ok(())
    }

    fn check_closed(&self) -> Result<()> {
        if !self.closed {
            return Err(RegionError::Unclosed {
                segments: self.curves.len(),
            }
            .into());
        }
        Ok(())
    }
}

/// Validates a refractive index.
pub(crate) fn check_index(n: f64) -> Result<()> {
    if !n.is_finite() || n <= 0.0 {
        return Err(OpticsError::InvalidParameter(format!(
            "refractive index must be finite and positive, got {n}"
        )));
    }
    Ok(())
}

/// Reorders runs of hits whose distances agree within `eps` by curve index.
fn order_ties(hits: &mut [BoundaryHit], eps: f64) {
    let mut begin = 0;
    while begin < hits.len() {
        let mut end = begin + 1;
        while end < hits.len() && hits[end].distance - hits[begin].distance <= eps {
            end += 1;
        }
        hits[begin..end].sort_by_key(|h| h.curve);
        begin = end;
    }
}
