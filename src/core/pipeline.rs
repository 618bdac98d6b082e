use crate::core::geometry::VertexOut;
use nalgebra::Vector3;

/// The programmable pixel stage of the software path.
///
/// Receives the interpolated attributes of one covered pixel and the
/// normalized direction from the camera to that pixel's world position, and
/// returns a linear RGB color. Values above 1 are allowed; the rasterizer
/// rescales them before packing.
pub trait PixelShader {
    fn shade(&self, fragment: &VertexOut, view_direction: &Vector3<f32>) -> Vector3<f32>;
}

impl<F> PixelShader for F
where
    F: Fn(&VertexOut, &Vector3<f32>) -> Vector3<f32>,
{
    fn shade(&self, fragment: &VertexOut, view_direction: &Vector3<f32>) -> Vector3<f32> {
        self(fragment, view_direction)
    }
}
