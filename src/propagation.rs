/// Refraction and reflection at region boundaries, and the step loop that
/// grows a ray's part chain.
use tracing::{debug, trace, warn};

use crate::error::{PropagationError, Result};
use crate::geometry::Line;
use crate::math::{Point2, Tolerance, Vector2};
use crate::ray::{Part, Ray, RayStatus};
use crate::region::{BoundaryHit, Containment, Region};

/// Engine-wide settings for tracing rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceConfig {
    /// Coincidence, tangency and self-intersection tolerance.
    pub tolerance: Tolerance,
    /// Maximum number of parts in one ray before tracing gives up.
    pub max_parts: usize,
    /// Refractive index outside every region.
    pub ambient_index: f64,
}

impl TraceConfig {
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_max_parts(mut self, max_parts: usize) -> Self {
        self.max_parts = max_parts;
        self
    }

    #[must_use]
    pub fn with_ambient_index(mut self, ambient_index: f64) -> Self {
        self.ambient_index = ambient_index;
        self
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            max_parts: 10_000,
            ambient_index: 1.0,
        }
    }
}

/// What happened to a ray at a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Transmitted into the medium on the other side.
    Refracted,
    /// Totally internally reflected.
    Reflected,
}

/// Applies Snell's law at a surface with normal `normal` (either
/// orientation) to the unit direction `u`, going from index `n1` to `n2`.
///
/// Falls back to specular reflection when `n1 sin θ1 / n2 > 1`.
#[must_use]
pub fn refract(u: &Vector2, normal: &Vector2, n1: f64, n2: f64) -> (Vector2, Interaction) {
    // Orient the normal against the incoming direction.
    let mut nn = normal.normalize();
    let mut cos_i = -nn.dot(u);
    if cos_i < 0.0 {
        nn = -nn;
        cos_i = -cos_i;
    }
    let mu = n1 / n2;
    let k = (mu * mu).mul_add(-cos_i.mul_add(-cos_i, 1.0), 1.0);
    if k < 0.0 {
        let reflected = u + nn * (2.0 * cos_i);
        (reflected.normalize(), Interaction::Reflected)
    } else {
        let transmitted = u * mu + nn * (mu * cos_i - k.sqrt());
        (transmitted.normalize(), Interaction::Refracted)
    }
}

/// Traces rays through a fixed set of regions.
///
/// Regions are only read; they are consulted in the given order, which
/// also breaks ties between regions hit at the same distance.
pub struct Propagate<'a> {
    regions: &'a [&'a Region],
    config: &'a TraceConfig,
}

impl<'a> Propagate<'a> {
    /// Creates a new `Propagate` operation.
    #[must_use]
    pub fn new(regions: &'a [&'a Region], config: &'a TraceConfig) -> Self {
        Self { regions, config }
    }

    /// Re-traces `ray` from part `from_part` onward (from its origin when
    /// `from_part` is 0), replacing every later part.
    ///
    /// # Errors
    ///
    /// Returns `PropagationError::LimitExceeded` when the ray reaches
    /// `max_parts`; the ray keeps the parts computed so far and is marked
    /// [`RayStatus::Incomplete`].
    pub fn execute(&self, ray: &mut Ray, from_part: usize) -> Result<()> {
        if from_part == 0 {
            let n0 = match ray.requested_index() {
                Some(n) => n,
                None => self.medium_at(ray.line0().origin(), ray.line0().direction(), None)?,
            };
            ray.restart(n0);
            ray.reopen_at(0);
        } else {
            ray.reopen_at(from_part.min(ray.parts().len() - 1));
        }

        loop {
            let part = *ray.last_part();
            let Some((region, hit)) = self.nearest_hit(&part.line)? else {
                ray.set_status(RayStatus::Complete);
                debug!(parts = ray.parts().len(), "ray escaped");
                return Ok(());
            };

            if let Some(last) = ray.parts_mut().last_mut() {
                last.s = hit.distance;
            }

            let parts = ray.parts().len();
            if parts >= self.config.max_parts {
                ray.set_status(RayStatus::Incomplete);
                warn!(parts, "ray reached the part limit");
                return Err(PropagationError::LimitExceeded { parts }.into());
            }

            let next = self.cross(&part, region, &hit)?;
            ray.parts_mut().push(next);
        }
    }

    /// Refractive index at `p`: that of the innermost region containing
    /// it (smallest enclosed area, the most recently added on a tie), else
    /// the ambient index. Points on a boundary are resolved a short step
    /// further along `dir`. Region `skip` is ignored.
    ///
    /// # Errors
    ///
    /// Fails only if a region was never closed.
    pub fn medium_at(&self, p: &Point2, dir: &Vector2, skip: Option<usize>) -> Result<f64> {
        let tol = &self.config.tolerance;
        let probe = p + dir * (tol.eps_at(p) * 1e3);
        let mut innermost: Option<(f64, f64)> = None;
        for (i, region) in self.regions.iter().enumerate().rev() {
            if Some(i) == skip {
                continue;
            }
            let inside = match region.classify(p, tol)? {
                Containment::Inside => true,
                Containment::Outside => false,
                Containment::OnBoundary => region.contains(&probe, tol)?,
            };
            if !inside {
                continue;
            }
            let area = region.signed_area()?.abs();
            match innermost {
                Some((best, _)) if best <= area => {}
                _ => innermost = Some((area, region.index())),
            }
        }
        Ok(innermost.map_or(self.config.ambient_index, |(_, n)| n))
    }

    /// Nearest forward boundary crossing over all regions.
    fn nearest_hit(&self, line: &Line) -> Result<Option<(usize, BoundaryHit)>> {
        let eps = self.config.tolerance.eps_at(line.origin());
        let mut best: Option<(usize, BoundaryHit)> = None;
        for (i, region) in self.regions.iter().enumerate() {
            let Some(hit) = region.intersect(line, &self.config.tolerance)?.first().copied() else {
                continue;
            };
            match best {
                Some((_, b)) if hit.distance >= b.distance - eps => {}
                _ => best = Some((i, hit)),
            }
        }
        Ok(best)
    }

    /// Builds the part leaving boundary crossing `hit` of region `region`.
    fn cross(&self, part: &Part, region: usize, hit: &BoundaryHit) -> Result<Part> {
        let r = self.regions[region];
        let u = part.line.direction();
        let outward = r.outward_normal(hit.curve, &hit.point)?;
        let entering = u.dot(&outward) < 0.0;

        let n1 = part.n;
        // Entering, the region itself may hold a smaller one sharing this
        // boundary; leaving, it no longer counts.
        let n2 = if entering {
            self.medium_at(&hit.point, u, None)?
        } else {
            self.medium_at(&hit.point, u, Some(region))?
        };

        let (dir, interaction) = refract(u, &outward, n1, n2);
        let n = match interaction {
            Interaction::Refracted => n2,
            Interaction::Reflected => n1,
        };
        trace!(
            x = hit.point.x,
            y = hit.point.y,
            n1,
            n2,
            ?interaction,
            "boundary crossing"
        );
        Ok(Part::new(Line::new(hit.point, dir)?, f64::INFINITY, n))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::OpticsError;
    use approx::assert_relative_eq;

    fn slab(x0: f64, x1: f64, n: f64) -> Region {
        let mut region = Region::new(n).unwrap();
        region.start(Point2::new(x0, -100.0)).unwrap();
        region.add_line(Point2::new(x1, -100.0)).unwrap();
        region.add_line(Point2::new(x1, 100.0)).unwrap();
        region.add_line(Point2::new(x0, 100.0)).unwrap();
        region.close().unwrap();
        region
    }

    fn ray(origin: Point2, dir: Vector2) -> Ray {
        Ray::new(Line::new(origin, dir).unwrap(), 1.0, None).unwrap()
    }

    #[test]
    fn normal_incidence_is_undeviated() {
        let (t, kind) = refract(&Vector2::new(1.0, 0.0), &Vector2::new(-1.0, 0.0), 1.0, 1.5);
        assert_eq!(kind, Interaction::Refracted);
        assert_relative_eq!(t, Vector2::new(1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn snell_law_holds() {
        let theta1: f64 = 0.5;
        let u = Vector2::new(theta1.cos(), theta1.sin());
        // Surface normal along x; either orientation works.
        for normal in [Vector2::new(1.0, 0.0), Vector2::new(-1.0, 0.0)] {
            let (t, kind) = refract(&u, &normal, 1.0, 1.5);
            assert_eq!(kind, Interaction::Refracted);
            let sin2 = t.y;
            assert_relative_eq!(theta1.sin(), 1.5 * sin2, epsilon = 1e-12);
            assert!(t.x > 0.0);
        }
    }

    #[test]
    fn total_internal_reflection_beyond_critical_angle() {
        let critical = (1.0_f64 / 1.5).asin();
        let theta1 = critical + 0.05;
        let u = Vector2::new(theta1.cos(), theta1.sin());
        let (r, kind) = refract(&u, &Vector2::new(1.0, 0.0), 1.5, 1.0);
        assert_eq!(kind, Interaction::Reflected);
        assert_relative_eq!(r, Vector2::new(-u.x, u.y), epsilon = 1e-12);

        let below = critical - 0.05;
        let u = Vector2::new(below.cos(), below.sin());
        let (_, kind) = refract(&u, &Vector2::new(1.0, 0.0), 1.5, 1.0);
        assert_eq!(kind, Interaction::Refracted);
    }

    #[test]
    fn slab_round_trip_restores_direction() {
        let glass = slab(10.0, 20.0, 1.5);
        let regions = [&glass];
        let config = TraceConfig::default();
        let mut r = ray(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.4));
        Propagate::new(&regions, &config).execute(&mut r, 0).unwrap();

        assert_eq!(r.status(), RayStatus::Complete);
        let parts = r.parts();
        assert_eq!(parts.len(), 3);
        assert_relative_eq!(parts[0].n, 1.0);
        assert_relative_eq!(parts[1].n, 1.5);
        assert_relative_eq!(parts[2].n, 1.0);
        assert!(parts[1].line.direction().y < parts[0].line.direction().y);
        assert_relative_eq!(
            *parts[2].line.direction(),
            *parts[0].line.direction(),
            epsilon = 1e-12
        );
        assert!(parts[2].is_unbounded());
    }

    #[test]
    fn chain_is_continuous() {
        let glass = slab(10.0, 20.0, 1.5);
        let regions = [&glass];
        let config = TraceConfig::default();
        let mut r = ray(Point2::new(0.0, 3.0), Vector2::new(1.0, -0.7));
        Propagate::new(&regions, &config).execute(&mut r, 0).unwrap();
        for pair in r.parts().windows(2) {
            assert_relative_eq!(pair[0].end().unwrap(), *pair[1].line.origin(), epsilon = 1e-9);
        }
        let unbounded = r.parts().iter().filter(|p| p.is_unbounded()).count();
        assert_eq!(unbounded, 1);
        assert!(r.last_part().is_unbounded());
    }

    #[test]
    fn ray_starting_inside_takes_the_region_index() {
        let glass = slab(-10.0, 10.0, 1.5);
        let regions = [&glass];
        let config = TraceConfig::default();
        let mut r = ray(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
        let engine = Propagate::new(&regions, &config);
        engine.execute(&mut r, 0).unwrap();
        assert_relative_eq!(r.parts()[0].n, 1.5);
        assert_relative_eq!(r.parts()[1].n, 1.0);
        assert_relative_eq!(
            engine
                .medium_at(&Point2::new(50.0, 0.0), &Vector2::new(1.0, 0.0), None)
                .unwrap(),
            1.0
        );
    }

    #[test]
    fn nested_region_exit_returns_to_outer_medium() {
        let outer = slab(0.0, 30.0, 1.2);
        let inner = slab(10.0, 20.0, 1.8);
        let regions = [&outer, &inner];
        let config = TraceConfig::default();
        let mut r = ray(Point2::new(-5.0, 0.0), Vector2::new(1.0, 0.0));
        Propagate::new(&regions, &config).execute(&mut r, 0).unwrap();
        let indices: Vec<f64> = r.parts().iter().map(|p| p.n).collect();
        assert_eq!(indices, vec![1.0, 1.2, 1.8, 1.2, 1.0]);
    }

    #[test]
    fn inner_region_wins_whatever_the_insertion_order() {
        let inner = slab(10.0, 20.0, 1.8);
        let outer = slab(0.0, 30.0, 1.2);
        let regions = [&inner, &outer];
        let config = TraceConfig::default();
        let engine = Propagate::new(&regions, &config);

        let mut entering = ray(Point2::new(-5.0, 0.0), Vector2::new(1.0, 0.0));
        engine.execute(&mut entering, 0).unwrap();
        let indices: Vec<f64> = entering.parts().iter().map(|p| p.n).collect();
        assert_eq!(indices, vec![1.0, 1.2, 1.8, 1.2, 1.0]);

        let mut starting = ray(Point2::new(15.0, 0.0), Vector2::new(1.0, 0.0));
        engine.execute(&mut starting, 0).unwrap();
        let indices: Vec<f64> = starting.parts().iter().map(|p| p.n).collect();
        assert_eq!(indices, vec![1.8, 1.2, 1.0]);
        assert_relative_eq!(starting.parts()[0].s, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn shared_edge_tie_goes_to_the_earlier_region() {
        let left = slab(10.0, 20.0, 1.5);
        let right = slab(20.0, 30.0, 1.8);
        let config = TraceConfig::default();
        let line = Line::new(Point2::new(15.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();

        for regions in [[&left, &right], [&right, &left]] {
            let engine = Propagate::new(&regions, &config);
            let (region, hit) = engine.nearest_hit(&line).unwrap().unwrap();
            assert_eq!(region, 0);
            assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-9);

            // Either crossing leads into the same medium.
            let mut r = ray(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
            engine.execute(&mut r, 0).unwrap();
            let indices: Vec<f64> = r.parts().iter().map(|p| p.n).collect();
            assert_eq!(indices, vec![1.0, 1.5, 1.8, 1.0]);
        }
    }

    #[test]
    fn immersed_slab_uses_the_ambient_index() {
        let glass = slab(10.0, 20.0, 1.5);
        let regions = [&glass];
        let config = TraceConfig::default()
            .with_ambient_index(1.33)
            .with_tolerance(Tolerance::new(1e-8, 1e-8));
        let mut r = ray(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
        Propagate::new(&regions, &config).execute(&mut r, 0).unwrap();
        let indices: Vec<f64> = r.parts().iter().map(|p| p.n).collect();
        assert_eq!(indices, vec![1.33, 1.5, 1.33]);
    }

    #[test]
    fn part_cap_marks_ray_incomplete() {
        let glass = slab(10.0, 20.0, 1.5);
        let regions = [&glass];
        let config = TraceConfig::default().with_max_parts(2);
        let mut r = ray(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
        let err = Propagate::new(&regions, &config)
            .execute(&mut r, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            OpticsError::Propagation(PropagationError::LimitExceeded { parts: 2 })
        ));
        assert_eq!(r.status(), RayStatus::Incomplete);
        assert_eq!(r.parts().len(), 2);
        assert!(r.parts().iter().all(|p| !p.is_unbounded()));
    }
}
