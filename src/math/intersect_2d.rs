use super::arc_2d::angle_to_arc_param;
use super::vector_2d::cross;
use super::{Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let denom = cross(d1, d2);
    if denom.abs() < TOLERANCE * d1.norm() * d2.norm() {
        return None;
    }
    let d = p2 - p1;
    let t = cross(&d, d2) / denom;
    let u = cross(&d, d1) / denom;
    Some((t, u))
}

/// Intersection of the line `p + t * dir` with the bounded segment `a → b`.
///
/// Returns `(t, v)` where `v` is the parameter on the segment, accepted in
/// `[0, 1]` widened by `eps` (a length) at both ends so that shared
/// endpoints of adjacent segments are never missed.
#[must_use]
pub fn line_segment_intersect_2d(
    p: &Point2,
    dir: &Vector2,
    a: &Point2,
    b: &Point2,
    eps: f64,
) -> Option<(f64, f64)> {
    let seg = b - a;
    let seg_len = seg.norm();
    if seg_len < TOLERANCE {
        return None;
    }
    let (t, v) = line_line_intersect_2d(p, dir, a, &seg)?;
    let slack = eps / seg_len;
    if v >= -slack && v <= 1.0 + slack {
        Some((t, v.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of the line `p + t * dir` with a full circle.
///
/// Returns the real roots `t` in increasing order: none, one (tangent,
/// decided within `eps`), or two. A discriminant that is negative only by
/// floating-point noise is treated as zero.
#[must_use]
pub fn line_circle_intersect_2d(
    p: &Point2,
    dir: &Vector2,
    center: &Point2,
    radius: f64,
    eps: f64,
) -> Vec<f64> {
    let a = dir.norm_squared();
    if a < TOLERANCE * TOLERANCE || radius < TOLERANCE {
        return Vec::new();
    }

    // Substitute the parametric line into the circle equation:
    // |p + t·dir - c|² = r²
    let f = p - center;
    let b = 2.0 * f.dot(dir);
    let c = f.norm_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    // Scale the noise guard with the terms that produced the discriminant.
    let noise = eps * (b.abs() + 4.0 * a * radius) * 2.0;
    if discriminant < -noise {
        return Vec::new();
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();

    if disc_sqrt * disc_sqrt <= noise {
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    }
}

/// Intersection of the line `p + t * dir` with a circular arc.
///
/// The arc has `center`, `radius`, `start_angle`, and signed `sweep`.
/// Returns `(t, t_arc)` pairs where `t_arc` in `[0, 1]` is the parameter on the arc.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn line_arc_intersect_2d(
    p: &Point2,
    dir: &Vector2,
    center: &Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    eps: f64,
) -> Vec<(f64, f64)> {
    let mut results = Vec::new();
    if sweep.abs() < TOLERANCE {
        return results;
    }
    let angular_eps = eps / radius.max(TOLERANCE);
    for t in line_circle_intersect_2d(p, dir, center, radius, eps) {
        let hit = p + dir * t;
        let angle = (hit.y - center.y).atan2(hit.x - center.x);
        if let Some(t_arc) = angle_to_arc_param(angle, start_angle, sweep, angular_eps) {
            results.push((t, t_arc));
        }
    }
    results
}
