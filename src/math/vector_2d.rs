use super::{Vector2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Returns the unit vector along `v`.
///
/// # Errors
///
/// Returns `GeometryError::ZeroVector` if `v` has (near) zero length.
pub fn normalize(v: &Vector2) -> Result<Vector2> {
    let len = v.norm();
    if !len.is_finite() || len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(v / len)
}

/// Scalar 2D cross product `a.x * b.y - a.y * b.x`.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rotates `v` counter-clockwise by `angle` radians.
#[must_use]
pub fn rotate(v: &Vector2, angle: f64) -> Vector2 {
    let (s, c) = angle.sin_cos();
    Vector2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Left-pointing perpendicular `(-y, x)`.
#[must_use]
pub fn left_normal(v: &Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Right-pointing perpendicular `(y, -x)`.
#[must_use]
pub fn right_normal(v: &Vector2) -> Vector2 {
    Vector2::new(v.y, -v.x)
}
