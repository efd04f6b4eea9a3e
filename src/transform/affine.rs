//! Affine transform helpers.

use crate::foundation::core::{Affine, Vec2};

/// Compose so that `new` is applied to points first, then `existing`.
#[inline]
pub fn compose(new: Affine, existing: Affine) -> Affine {
    existing * new
}

/// Per-axis scale factors: lengths of the transformed unit vectors.
pub fn axis_scales(a: Affine) -> (f64, f64) {
    let [a, b, c, d, _, _] = a.as_coeffs();
    ((a * a + b * b).sqrt(), (c * c + d * d).sqrt())
}

/// Transform a distance vector (ignores translation).
pub fn transform_distance(a: Affine, dx: f64, dy: f64) -> Vec2 {
    let [a, b, c, d, _, _] = a.as_coeffs();
    Vec2::new(a * dx + c * dy, b * dx + d * dy)
}

/// Geometric-mean scale, used for scalar lengths that have no direction.
pub fn mean_scale(a: Affine) -> f64 {
    a.determinant().abs().sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/transform/affine.rs"]
mod tests;
