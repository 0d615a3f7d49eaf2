/// 2D circular arc math utilities.
///
/// Arcs are stored in center-radius-angle form: `center`, `radius`,
/// `start_angle` and a signed `sweep`.
/// - `sweep > 0`: counter-clockwise arc
/// - `sweep < 0`: clockwise arc
use std::f64::consts::{PI, TAU};

use super::vector_2d::left_normal;
use super::{Point2, Vector2, TOLERANCE};

/// Derives the arc running from `start` to `end` whose direction of travel
/// at `end` is `end_tangent`.
///
/// Returns `(center, radius, start_angle, sweep)`, or `None` when the
/// tangent is parallel to the chord (zero curvature) or either input is
/// degenerate.
#[must_use]
pub fn arc_from_end_tangent(
    start: &Point2,
    end: &Point2,
    end_tangent: &Vector2,
) -> Option<(Point2, f64, f64, f64)> {
    let chord = end - start;
    let chord_len = chord.norm();
    let tangent_len = end_tangent.norm();
    if chord_len < TOLERANCE || tangent_len < TOLERANCE {
        return None;
    }
    let t = end_tangent / tangent_len;

    // The center sits on the normal through `end`: C = end + λ·N, with
    // |C - start| = |C - end| = |λ|.
    let n = left_normal(&t);
    let denom = 2.0 * n.dot(&chord);
    if denom.abs() < TOLERANCE * chord_len {
        return None;
    }
    let lambda = -chord.norm_squared() / denom;
    let center = end + n * lambda;
    let radius = lambda.abs();

    let start_angle = (start.y - center.y).atan2(start.x - center.x);
    let end_angle = (end.y - center.y).atan2(end.x - center.x);

    // Center on the left of the travel direction means counter-clockwise.
    let sweep = if lambda > 0.0 {
        (end_angle - start_angle).rem_euclid(TAU)
    } else {
        -(start_angle - end_angle).rem_euclid(TAU)
    };

    Some((center, radius, start_angle, sweep))
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, start_angle: f64, sweep: f64, t: f64) -> Point2 {
    let angle = start_angle + sweep * t;
    Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Unit tangent (direction of travel) at an arbitrary point on the circle.
#[must_use]
pub fn arc_tangent_at_point(center: &Point2, sweep: f64, p: &Point2) -> Vector2 {
    let radial = p - center;
    let len = radial.norm();
    if len < TOLERANCE {
        return Vector2::zeros();
    }
    let t = left_normal(&(radial / len));
    if sweep >= 0.0 {
        t
    } else {
        -t
    }
}

/// Signed area between an arc and its chord.
///
/// Added to the shoelace sum of a closed boundary it yields the exact
/// enclosed area.
#[must_use]
pub fn arc_segment_area(radius: f64, sweep: f64) -> f64 {
    0.5 * radius * radius * (sweep - sweep.sin())
}

/// Converts an absolute angle to an arc parameter `t` in `[0, 1]`.
///
/// Returns `None` if the angle is not within the arc's angular range
/// (with `eps` of slack, in radians), respecting the winding direction.
#[must_use]
pub fn angle_to_arc_param(angle: f64, start_angle: f64, sweep: f64, eps: f64) -> Option<f64> {
    if sweep.abs() < TOLERANCE {
        return None;
    }
    let mut delta = angle - start_angle;

    if sweep > 0.0 {
        while delta < -eps {
            delta += 2.0 * PI;
        }
        while delta > 2.0 * PI + eps {
            delta -= 2.0 * PI;
        }
    } else {
        while delta > eps {
            delta -= 2.0 * PI;
        }
        while delta < -2.0 * PI - eps {
            delta += 2.0 * PI;
        }
    }

    let slack = eps / sweep.abs();
    let t = delta / sweep;
    if t >= -slack && t <= 1.0 + slack {
        Some(t.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Computes the number of line segments needed to approximate an arc
/// within the given tolerance.
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < TOLERANCE || abs_sweep < TOLERANCE || tolerance <= 0.0 {
        return 1;
    }
    // From the sagitta formula: sagitta = r * (1 - cos(θ/2))
    let max_angle = if tolerance >= radius {
        PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.max(1)
}

/// For a tangent parallel to its chord, returns whether it points along
/// the chord (a straight run) rather than back against it.
#[must_use]
pub fn tangent_follows_chord(chord: &Vector2, tangent: &Vector2) -> bool {
    chord.dot(tangent) > 0.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOL: f64 = 1e-10;

    #[test]
    fn arc_with_tilted_end_tangent() {
        // From (110, 190) down to (110, 60), arriving with direction (10, -20).
        let (c, r, sa, sw) = arc_from_end_tangent(
            &Point2::new(110.0, 190.0),
            &Point2::new(110.0, 60.0),
            &Vector2::new(10.0, -20.0),
        )
        .unwrap();
        assert_relative_eq!(c, Point2::new(240.0, 125.0), epsilon = 1e-9);
        assert_relative_eq!(r, 65.0 * 5.0_f64.sqrt(), epsilon = 1e-9);
        assert!(sw > 0.0 && sw < PI, "sweep={sw}");

        let p1 = arc_point_at(&c, r, sa, sw, 1.0);
        assert_relative_eq!(p1, Point2::new(110.0, 60.0), epsilon = 1e-9);
        let t1 = arc_tangent_at_point(&c, sw, &p1);
        let expected = Vector2::new(1.0, -2.0) / 5.0_f64.sqrt();
        assert_relative_eq!(t1, expected, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_semicircle() {
        // From (0,0) to (2,0) arriving downward: goes over the top, clockwise.
        let (c, r, _sa, sw) = arc_from_end_tangent(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Vector2::new(0.0, -1.0),
        )
        .unwrap();
        assert_relative_eq!(c, Point2::new(1.0, 0.0), epsilon = TOL);
        assert_relative_eq!(r, 1.0, epsilon = TOL);
        assert_relative_eq!(sw, -PI, epsilon = TOL);
    }

    #[test]
    fn tangent_parallel_to_chord_has_no_arc() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(arc_from_end_tangent(&a, &b, &Vector2::new(1.0, 0.0)).is_none());
        assert!(arc_from_end_tangent(&a, &b, &Vector2::new(-1.0, 0.0)).is_none());
        assert!(tangent_follows_chord(&(b - a), &Vector2::new(3.0, 0.0)));
        assert!(!tangent_follows_chord(&(b - a), &Vector2::new(-3.0, 0.0)));
    }

    #[test]
    fn clockwise_tangent_at_point() {
        let c = Point2::new(0.0, 0.0);
        let p = arc_point_at(&c, 2.0, 0.3, -1.0, 0.5);
        let t = arc_tangent_at_point(&c, -1.0, &p);
        // Clockwise travel at angle θ runs along (sin θ, -cos θ).
        let angle: f64 = -0.2;
        assert_relative_eq!(t, Vector2::new(angle.sin(), -angle.cos()), epsilon = TOL);
    }

    #[test]
    fn segment_area_of_semicircle() {
        assert_relative_eq!(arc_segment_area(1.0, PI), PI / 2.0, epsilon = TOL);
        assert_relative_eq!(arc_segment_area(1.0, -PI), -PI / 2.0, epsilon = TOL);
    }

    #[test]
    fn angle_param_respects_winding() {
        // CCW quarter from 0 to π/2 contains π/4 at t=0.5.
        let t = angle_to_arc_param(PI / 4.0, 0.0, PI / 2.0, 1e-9).unwrap();
        assert_relative_eq!(t, 0.5, epsilon = TOL);
        // CW quarter from 0 to -π/2 does not contain π/4.
        assert!(angle_to_arc_param(PI / 4.0, 0.0, -PI / 2.0, 1e-9).is_none());
        // Wrapping across ±π.
        assert!(angle_to_arc_param(-3.0, 3.0, 0.5, 1e-9).is_some());
    }

    #[test]
    fn subdivision_count_depends_on_tolerance() {
        assert_eq!(arc_subdivision_count(1.0, PI, 10.0), 1);
        assert!(arc_subdivision_count(1.0, PI, 0.001) > 10);
    }
}
