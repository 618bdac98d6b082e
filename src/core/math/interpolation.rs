use nalgebra::{Vector2, Vector3};
use std::ops::{Add, Mul};

/// Twice-area threshold below which a projected triangle counts as degenerate.
pub const EPSILON: f32 = 1e-5;

/// Types that can be blended linearly across a triangle's surface.
///
/// Requires `Add` and `Mul<f32>` so a barycentric combination
/// `a * w0 + b * w1 + c * w2` can be formed.
pub trait Interpolatable: Copy + Add<Output = Self> + Mul<f32, Output = Self> {}

impl<T> Interpolatable for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> {}

/// 2D cross product (z component of the 3D cross product).
#[inline(always)]
pub fn cross_2d(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Reconstructs a per-vertex quantity at a pixel as the reciprocal of the
/// weighted reciprocals: `1 / (w0 / v0 + w1 / v1 + w2 / v2)`.
#[inline]
pub fn reciprocal_interpolate(values: [f32; 3], weights: &Vector3<f32>) -> f32 {
    1.0 / (weights.x / values[0] + weights.y / values[1] + weights.z / values[2])
}

/// Perspective-correct interpolation of a vertex attribute.
///
/// Each attribute is divided by its vertex's clip w, blended with the
/// screen-space weights, and the sum is multiplied back by the pixel's
/// reconstructed w.
#[inline]
pub fn perspective_interpolate<T: Interpolatable>(
    attributes: [T; 3],
    vertex_w: [f32; 3],
    weights: &Vector3<f32>,
    pixel_w: f32,
) -> T {
    (attributes[0] * (weights.x / vertex_w[0])
        + attributes[1] * (weights.y / vertex_w[1])
        + attributes[2] * (weights.z / vertex_w[2]))
        * pixel_w
}
