/// Presentation helpers: turning part chains into drawable polylines.
///
/// The engine always stores true geometry, with an unbounded last part.
/// Everything here is a pure function of that geometry.
use slotmap::SecondaryMap;

use crate::math::Point2;
use crate::ray::Ray;
use crate::scene::{PropagationReport, RayId, Scene};

/// How far to draw a ray whose last part is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayLength {
    /// Draw the unbounded last part with this geometric length.
    Fixed(f64),
    /// Stop drawing once the accumulated optical path length reaches the
    /// budget. Finite parts are cut short as well.
    ///
    /// The budget left for a part is divided by its index, so a part in
    /// glass is drawn shorter than the same budget in air. Drawing the
    /// leftover `L - Σ s·n` as a plain length instead only agrees with this
    /// when the last part is in a medium with `n = 1`.
    OpticalPath(f64),
}

/// Vertices of the drawn path of `ray`: the origin followed by the end of
/// each drawn part. Negative or NaN lengths are treated as zero.
#[must_use]
pub fn polyline(ray: &Ray, policy: DisplayLength) -> Vec<Point2> {
    let parts = ray.parts();
    let mut points = Vec::with_capacity(parts.len() + 1);
    points.push(*parts[0].line.origin());

    match policy {
        DisplayLength::Fixed(len) => {
            for part in parts {
                let s = if part.is_unbounded() { len.max(0.0) } else { part.s };
                points.push(part.line.point_at(s));
            }
        }
        DisplayLength::OpticalPath(budget) => {
            let mut remaining = budget.max(0.0);
            for part in parts {
                let opl = part.optical_length();
                if part.is_unbounded() || opl >= remaining {
                    points.push(part.line.point_at(remaining / part.n));
                    break;
                }
                points.push(part.line.point_at(part.s));
                remaining -= opl;
            }
        }
    }
    points
}

/// Renderer-side lookup from ray to its drawn path.
///
/// The scene never references this registry; it is refreshed from the
/// [`PropagationReport`]s the scene hands out.
#[derive(Debug, Clone)]
pub struct PathRegistry {
    policy: DisplayLength,
    paths: SecondaryMap<RayId, Vec<Point2>>,
}

impl PathRegistry {
    /// Creates an empty registry drawing with `policy`.
    #[must_use]
    pub fn new(policy: DisplayLength) -> Self {
        Self {
            policy,
            paths: SecondaryMap::new(),
        }
    }

    /// The display policy.
    #[must_use]
    pub fn policy(&self) -> DisplayLength {
        self.policy
    }

    /// Changes the display policy and redraws every ray.
    pub fn set_policy(&mut self, policy: DisplayLength, scene: &Scene) {
        self.policy = policy;
        self.rebuild(scene);
    }

    /// Redraws the rays listed in `report` and forgets rays that no longer
    /// exist.
    pub fn sync(&mut self, scene: &Scene, report: &PropagationReport) {
        for &id in &report.traced {
            if let Ok(ray) = scene.ray(id) {
                self.paths.insert(id, polyline(ray, self.policy));
            }
        }
        self.paths.retain(|id, _| scene.ray(id).is_ok());
    }

    /// Redraws every ray of the scene.
    pub fn rebuild(&mut self, scene: &Scene) {
        self.paths.clear();
        for (id, ray) in scene.rays() {
            self.paths.insert(id, polyline(ray, self.policy));
        }
    }

    /// The drawn path of a ray.
    #[must_use]
    pub fn path(&self, id: RayId) -> Option<&[Point2]> {
        self.paths.get(id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RayId, &[Point2])> {
        self.paths.iter().map(|(id, p)| (id, p.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
