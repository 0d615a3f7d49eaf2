use crate::error::{OpticsError, Result};
use crate::geometry::Line;
use crate::math::vector_2d::normalize;
use crate::math::Vector2;
use crate::ray::Ray;
use crate::region::check_index;

/// Parametrization of a [`Beam`].
///
/// The beam holds `n_inter + 2` rays whose origin lines are linearly
/// interpolated, in both point and direction, from `line_start` to
/// `line_end`, and whose initial lengths go from `s_start` to `s_end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamParams {
    pub line_start: Line,
    pub line_end: Line,
    pub s_start: f64,
    pub s_end: f64,
    /// Number of rays between the two boundary rays.
    pub n_inter: i32,
    /// Index of the medium the rays start in; `None` looks it up in the scene.
    pub n: Option<f64>,
}

impl BeamParams {
    /// Creates beam parameters starting in whatever medium surrounds the rays.
    #[must_use]
    pub fn new(line_start: Line, line_end: Line, s_start: f64, s_end: f64, n_inter: i32) -> Self {
        Self {
            line_start,
            line_end,
            s_start,
            s_end,
            n_inter,
            n: None,
        }
    }

    /// Sets an explicit starting index.
    #[must_use]
    pub fn with_index(mut self, n: f64) -> Self {
        self.n = Some(n);
        self
    }
}

/// A beam of rays spread between two boundary lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    params: BeamParams,
}

impl Beam {
    /// Creates a new beam.
    ///
    /// # Errors
    ///
    /// Returns `OpticsError::InvalidParameter` if `n_inter < 0`, a length is
    /// negative or not finite, or the index is invalid, and
    /// `GeometryError::ZeroVector` if an interpolated direction vanishes.
    pub fn new(params: BeamParams) -> Result<Self> {
        let beam = Self { params };
        beam.initial_lines()?;
        Ok(beam)
    }

    /// Replaces the parametrization. The beam is unchanged on error.
    ///
    /// # Errors
    ///
    /// Same as [`Beam::new`].
    pub fn set(&mut self, params: BeamParams) -> Result<()> {
        *self = Self::new(params)?;
        Ok(())
    }

    /// Shifts both boundary lines, and so every ray origin, by `offset`.
    pub fn translate(&mut self, offset: &Vector2) {
        self.params.line_start = self.params.line_start.translated(offset);
        self.params.line_end = self.params.line_end.translated(offset);
    }

    /// Current parametrization.
    #[must_use]
    pub fn params(&self) -> &BeamParams {
        &self.params
    }

    /// Number of rays in the beam, `n_inter + 2`.
    #[must_use]
    pub fn ray_count(&self) -> usize {
        usize::try_from(self.params.n_inter).map_or(0, |n| n + 2)
    }

    /// Origin line and initial length of every ray, boundary rays first and last.
    ///
    /// # Errors
    ///
    /// See [`Beam::new`].
    #[allow(clippy::cast_precision_loss)]
    pub fn initial_lines(&self) -> Result<Vec<(Line, f64)>> {
        let p = &self.params;
        if p.n_inter < 0 {
            return Err(OpticsError::InvalidParameter(format!(
                "interior ray count must be >= 0, got {}",
                p.n_inter
            )));
        }
        for s in [p.s_start, p.s_end] {
            if !s.is_finite() || s < 0.0 {
                return Err(OpticsError::InvalidParameter(format!(
                    "initial ray length must be finite and >= 0, got {s}"
                )));
            }
        }
        if let Some(n) = p.n {
            check_index(n)?;
        }

        let count = self.ray_count();
        let last = (count - 1) as f64;
        let (a, b) = (&p.line_start, &p.line_end);
        (0..count)
            .map(|i| {
                let t = i as f64 / last;
                let origin = a.origin() + (b.origin() - a.origin()) * t;
                let dir = normalize(&(a.direction() + (b.direction() - a.direction()) * t))?;
                let s = p.s_start + (p.s_end - p.s_start) * t;
                Ok((Line::new(origin, dir)?, s))
            })
            .collect()
    }

    /// Builds the beam's rays in their initial, untraced state.
    ///
    /// # Errors
    ///
    /// See [`Beam::new`].
    pub fn rays(&self) -> Result<Vec<Ray>> {
        self.initial_lines()?
            .into_iter()
            .map(|(line, s)| Ray::new(line, s, self.params.n))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn params(n_inter: i32) -> BeamParams {
        BeamParams::new(
            Line::new(Point2::new(10.0, 50.0), Vector2::new(108.0, 0.0)).unwrap(),
            Line::new(Point2::new(10.0, 80.0), Vector2::new(108.0, 0.0)).unwrap(),
            100.0,
            100.0,
            n_inter,
        )
    }

    #[test]
    fn six_interior_rays_make_eight() {
        let beam = Beam::new(params(6)).unwrap();
        let rays = beam.rays().unwrap();
        assert_eq!(rays.len(), 8);
        for (i, ray) in rays.iter().enumerate() {
            let y = 50.0 + 30.0 * i as f64 / 7.0;
            assert_relative_eq!(*ray.line0().origin(), Point2::new(10.0, y), epsilon = 1e-12);
            assert_relative_eq!(*ray.line0().direction(), Vector2::new(1.0, 0.0));
            assert_relative_eq!(ray.s0(), 100.0);
        }
    }

    #[test]
    fn directions_and_lengths_are_interpolated() {
        let p = BeamParams::new(
            Line::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0)).unwrap(),
            Line::new(Point2::new(0.0, 10.0), Vector2::new(0.0, 1.0)).unwrap(),
            0.0,
            20.0,
            1,
        );
        let lines = Beam::new(p).unwrap().initial_lines().unwrap();
        assert_eq!(lines.len(), 3);
        let (mid, s) = lines[1];
        assert_relative_eq!(*mid.origin(), Point2::new(0.0, 5.0));
        let diag = Vector2::new(1.0, 1.0).normalize();
        assert_relative_eq!(*mid.direction(), diag, epsilon = 1e-12);
        assert_relative_eq!(s, 10.0);
    }

    #[test]
    fn negative_interior_count_is_rejected() {
        assert!(matches!(
            Beam::new(params(-1)),
            Err(OpticsError::InvalidParameter(_))
        ));
        let mut beam = Beam::new(params(0)).unwrap();
        assert_eq!(beam.ray_count(), 2);
        assert!(beam.set(params(-3)).is_err());
        assert_eq!(beam.params().n_inter, 0);
    }

    #[test]
    fn explicit_index_reaches_every_ray() {
        let rays = Beam::new(params(1).with_index(1.33)).unwrap().rays().unwrap();
        assert!(rays.iter().all(|r| r.requested_index() == Some(1.33)));
        assert!(Beam::new(params(1).with_index(0.0)).is_err());
    }

    #[test]
    fn opposed_boundary_directions_cannot_be_interpolated() {
        let p = BeamParams::new(
            Line::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0)).unwrap(),
            Line::new(Point2::new(0.0, 1.0), Vector2::new(-1.0, 0.0)).unwrap(),
            1.0,
            1.0,
            1,
        );
        assert!(Beam::new(p).is_err());
    }

    #[test]
    fn translate_shifts_every_origin() {
        let mut beam = Beam::new(params(6)).unwrap();
        beam.translate(&Vector2::new(0.0, 40.0));
        let lines = beam.initial_lines().unwrap();
        assert_relative_eq!(*lines[0].0.origin(), Point2::new(10.0, 90.0));
        assert_relative_eq!(*lines[7].0.origin(), Point2::new(10.0, 120.0));
    }
}
