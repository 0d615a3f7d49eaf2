use crate::error::{OpticsError, Result};
use crate::geometry::Line;
use crate::math::{Point2, Vector2};
use crate::region::check_index;

/// One straight leg of a ray: valid from `line.origin()` for a distance `s`
/// along `line.direction()`, through a medium of index `n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    /// Start point and unit direction of the leg.
    pub line: Line,
    /// Length of the leg, `f64::INFINITY` when unbounded.
    pub s: f64,
    /// Refractive index of the medium along the leg.
    pub n: f64,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub fn new(line: Line, s: f64, n: f64) -> Self {
        Self { line, s, n }
    }

    /// Returns whether the leg extends to infinity.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.s.is_infinite()
    }

    /// End point of the leg, `None` when unbounded.
    #[must_use]
    pub fn end(&self) -> Option<Point2> {
        (!self.is_unbounded()).then(|| self.line.point_at(self.s))
    }

    /// Optical path length `s * n` of the leg.
    #[must_use]
    pub fn optical_length(&self) -> f64 {
        self.s * self.n
    }
}

/// Propagation state of a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayStatus {
    /// Never traced, or edited since the last trace.
    Pending,
    /// Traced until an unbounded part was reached.
    Complete,
    /// Tracing stopped at the part cap; the chain is cut short.
    Incomplete,
}

/// An ordered chain of [`Part`]s, index 0 first.
///
/// Part `i` ends where part `i + 1` starts, and only the last part may be
/// unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    line0: Line,
    s0: f64,
    n0: Option<f64>,
    parts: Vec<Part>,
    status: RayStatus,
}

impl Ray {
    /// Creates a ray starting on `line0` with an initial part of length
    /// `s0`. With `n0 = None`, the index of the first part is taken from
    /// the medium at the origin when the ray is traced; until then it is 1.
    ///
    /// # Errors
    ///
    /// Returns `OpticsError::InvalidParameter` for a negative or NaN `s0`,
    /// or an invalid `n0`.
    pub fn new(line0: Line, s0: f64, n0: Option<f64>) -> Result<Self> {
        check_length(s0)?;
        if let Some(n) = n0 {
            check_index(n)?;
        }
        Ok(Self {
            line0,
            s0,
            n0,
            parts: vec![Part::new(line0, s0, n0.unwrap_or(1.0))],
            status: RayStatus::Pending,
        })
    }

    /// Origin line of the first part.
    #[must_use]
    pub fn line0(&self) -> &Line {
        &self.line0
    }

    /// Initial length of the first part, as requested by the source.
    #[must_use]
    pub fn s0(&self) -> f64 {
        self.s0
    }

    /// Explicit index of the first part, if one was given.
    #[must_use]
    pub fn requested_index(&self) -> Option<f64> {
        self.n0
    }

    /// The part chain.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The last part; a ray always has at least one.
    #[must_use]
    pub fn last_part(&self) -> &Part {
        // `parts` is never empty: every mutator keeps at least part 0.
        &self.parts[self.parts.len() - 1]
    }

    /// Current propagation state.
    #[must_use]
    pub fn status(&self) -> RayStatus {
        self.status
    }

    /// Appends a part starting at the end of the current last part. The ray
    /// is [`RayStatus::Pending`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns `OpticsError::InvalidParameter` if the last part is
    /// unbounded or the new length/index is invalid, and
    /// `GeometryError::ZeroVector` for a zero direction.
    pub fn add_part(&mut self, u: Vector2, s: f64, n: Option<f64>) -> Result<()> {
        check_length(s)?;
        let last = *self.last_part();
        let start = last.end().ok_or_else(|| {
            OpticsError::InvalidParameter("cannot append after an unbounded part".into())
        })?;
        let n = n.unwrap_or(last.n);
        check_index(n)?;
        self.parts.push(Part::new(Line::new(start, u)?, s, n));
        self.status = RayStatus::Pending;
        Ok(())
    }

    /// Sets the length of part `part_number`.
    ///
    /// Parts after it no longer start at its end point and are dropped;
    /// an unbounded length is only accepted on what becomes the last part.
    /// The ray is [`RayStatus::Pending`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns `OpticsError::InvalidParameter` for an unknown part or a
    /// negative or NaN length.
    pub fn change_s(&mut self, part_number: usize, new_s: f64) -> Result<()> {
        check_length(new_s)?;
        let part = self.parts.get_mut(part_number).ok_or_else(|| {
            OpticsError::InvalidParameter(format!("ray has no part {part_number}"))
        })?;
        part.s = new_s;
        self.parts.truncate(part_number + 1);
        self.status = RayStatus::Pending;
        Ok(())
    }

    /// Total optical path length over the finite parts.
    #[must_use]
    pub fn optical_path_length(&self) -> f64 {
        self.parts
            .iter()
            .filter(|p| !p.is_unbounded())
            .map(Part::optical_length)
            .sum()
    }

    /// End point of the last part, `None` when it is unbounded.
    #[must_use]
    pub fn end_point(&self) -> Option<Point2> {
        self.last_part().end()
    }

    /// Drops every part after `part_number` and makes it unbounded, ready
    /// for the engine to continue from it.
    pub(crate) fn reopen_at(&mut self, part_number: usize) {
        self.parts.truncate(part_number + 1);
        if let Some(part) = self.parts.last_mut() {
            part.s = f64::INFINITY;
        }
        self.status = RayStatus::Pending;
    }

    /// Resets the chain to its first part with index `n`.
    pub(crate) fn restart(&mut self, n: f64) {
        self.parts.clear();
        self.parts.push(Part::new(self.line0, self.s0, n));
        self.status = RayStatus::Pending;
    }

    pub(crate) fn parts_mut(&mut self) -> &mut Vec<Part> {
        &mut self.parts
    }

    pub(crate) fn set_status(&mut self, status: RayStatus) {
        self.status = status;
    }
}

fn check_length(s: f64) -> Result<()> {
    if s.is_nan() || s < 0.0 {
        return Err(OpticsError::InvalidParameter(format!(
            "part length must be non-negative, got {s}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn horizontal_ray() -> Ray {
        let line = Line::new(Point2::new(10.0, 50.0), Vector2::new(108.0, 0.0)).unwrap();
        Ray::new(line, 3.0, Some(1.0)).unwrap()
    }

    #[test]
    fn new_ray_has_its_initial_part() {
        let ray = horizontal_ray();
        assert_eq!(ray.parts().len(), 1);
        assert_eq!(ray.status(), RayStatus::Pending);
        assert_relative_eq!(ray.end_point().unwrap(), Point2::new(13.0, 50.0));
        assert_relative_eq!(ray.optical_path_length(), 3.0);
    }

    #[test]
    fn add_part_continues_from_the_end() {
        let mut ray = horizontal_ray();
        ray.add_part(Vector2::new(0.0, 2.0), 4.0, Some(1.5)).unwrap();
        let second = ray.parts()[1];
        assert_relative_eq!(*second.line.origin(), Point2::new(13.0, 50.0));
        assert_relative_eq!(*second.line.direction(), Vector2::new(0.0, 1.0));
        assert_relative_eq!(ray.optical_path_length(), 3.0 + 6.0);

        ray.add_part(Vector2::new(1.0, 0.0), f64::INFINITY, None).unwrap();
        assert!(ray.last_part().is_unbounded());
        assert_relative_eq!(ray.last_part().n, 1.5);
        assert!(ray.end_point().is_none());
        assert!(ray.add_part(Vector2::new(1.0, 0.0), 1.0, None).is_err());
    }

    #[test]
    fn change_s_drops_downstream_parts() {
        let mut ray = horizontal_ray();
        ray.add_part(Vector2::new(0.0, 1.0), 4.0, None).unwrap();
        ray.add_part(Vector2::new(1.0, 0.0), 5.0, None).unwrap();
        ray.change_s(0, 8.0).unwrap();
        assert_eq!(ray.parts().len(), 1);
        assert_relative_eq!(ray.end_point().unwrap(), Point2::new(18.0, 50.0));
        assert!(ray.change_s(3, 1.0).is_err());
        assert!(ray.change_s(0, -1.0).is_err());
    }

    #[test]
    fn manual_edits_reopen_a_traced_ray() {
        let mut ray = horizontal_ray();
        ray.set_status(RayStatus::Complete);
        ray.change_s(0, 6.0).unwrap();
        assert_eq!(ray.status(), RayStatus::Pending);

        ray.set_status(RayStatus::Complete);
        ray.add_part(Vector2::new(0.0, 1.0), 2.0, None).unwrap();
        assert_eq!(ray.status(), RayStatus::Pending);

        // A rejected edit leaves the status alone.
        ray.set_status(RayStatus::Complete);
        assert!(ray.change_s(5, 1.0).is_err());
        assert_eq!(ray.status(), RayStatus::Complete);
    }

    #[test]
    fn invalid_construction_is_rejected() {
        let line = Line::new(Point2::origin(), Vector2::new(1.0, 0.0)).unwrap();
        assert!(Ray::new(line, -1.0, None).is_err());
        assert!(Ray::new(line, 1.0, Some(-2.0)).is_err());
        assert!(Ray::new(line, f64::INFINITY, None).is_ok());
    }
}
