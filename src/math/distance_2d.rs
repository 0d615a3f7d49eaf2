use super::arc_2d::angle_to_arc_param;
use super::vector_2d::cross;
use super::{Point2, Vector2, TOLERANCE};

/// Returns the distance from `p` to the infinite line through `origin`
/// along the unit direction `dir`.
#[must_use]
pub fn point_to_line_dist(p: &Point2, origin: &Point2, dir: &Vector2) -> f64 {
    cross(dir, &(p - origin)).abs()
}

/// Returns the minimum distance from `p` to the line segment `a → b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < TOLERANCE * TOLERANCE {
        return (p - a).norm();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm()
}

/// Returns the minimum distance from `p` to a circular arc.
///
/// If the point's angle (relative to center) falls within the arc range,
/// the distance is `||point - center| - radius|`.
/// Otherwise, the distance is the minimum of the distances to the two arc endpoints.
#[must_use]
pub fn point_to_arc_dist(
    p: &Point2,
    center: &Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> f64 {
    let radial = p - center;
    let angle = radial.y.atan2(radial.x);
    if angle_to_arc_param(angle, start_angle, sweep, 1e-10).is_some() {
        return (radial.norm() - radius).abs();
    }

    let end_angle = start_angle + sweep;
    let ep0 = center + Vector2::new(start_angle.cos(), start_angle.sin()) * radius;
    let ep1 = center + Vector2::new(end_angle.cos(), end_angle.sin()) * radius;
    (p - ep0).norm().min((p - ep1).norm())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-10;

    #[test]
    fn line_dist_ignores_extent() {
        let d = point_to_line_dist(
            &Point2::new(-10.0, 3.0),
            &Point2::origin(),
            &Vector2::new(1.0, 0.0),
        );
        assert!((d - 3.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_perpendicular_projection() {
        let d = point_to_segment_dist(
            &Point2::new(1.0, 1.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
        );
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_endpoint_closest() {
        let d = point_to_segment_dist(
            &Point2::new(-1.0, 0.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
        );
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_degenerate() {
        let d = point_to_segment_dist(&Point2::new(3.0, 4.0), &Point2::origin(), &Point2::origin());
        assert!((d - 5.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn arc_dist_in_range() {
        let d = point_to_arc_dist(&Point2::new(0.0, 2.0), &Point2::origin(), 1.0, 0.0, PI);
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn arc_dist_outside_range() {
        // Below an upper semicircle: nearest points are the endpoints.
        let d = point_to_arc_dist(&Point2::new(0.0, -2.0), &Point2::origin(), 1.0, 0.0, PI);
        assert!((d - 5.0_f64.sqrt()).abs() < 1e-6, "d={d}");
    }

    #[test]
    fn arc_dist_on_arc() {
        let d = point_to_arc_dist(&Point2::new(0.0, 1.0), &Point2::origin(), 1.0, 0.0, PI);
        assert!(d.abs() < TOL, "d={d}");
    }
}
