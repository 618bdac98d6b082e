use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the transformation matrices used by the pipeline.
/// Written out by hand so the row/column layout of every matrix is explicit.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Creates a rotation matrix around the X-axis.
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,  -s,   0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Y-axis.
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Z-axis.
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,  -s,   0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a non-uniform scaling matrix.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Translation * RotX * RotY * RotZ * Scale, angles in degrees.
    pub fn model(position: &Vector3<f32>, rotation_deg: &Vector3<f32>, scale: &Vector3<f32>) -> Matrix4<f32> {
        Self::translation(position)
            * Self::rotation_x(rotation_deg.x.to_radians())
            * Self::rotation_y(rotation_deg.y.to_radians())
            * Self::rotation_z(rotation_deg.z.to_radians())
            * Self::scaling_nonuniform(scale)
    }

    /// Creates the camera projection matrix.
    ///
    /// The clip w carries the view-space depth (`+z` when left-handed, `-z`
    /// when right-handed) and z maps `near..far` onto `0..1` after the divide.
    pub fn projection(
        aspect_ratio: f32,
        tan_half_fov: f32,
        near: f32,
        far: f32,
        left_handed: bool,
    ) -> Matrix4<f32> {
        let x = 1.0 / (aspect_ratio * tan_half_fov);
        let y = 1.0 / tan_half_fov;
        let (z, z_offset, w) = if left_handed {
            (far / (far - near), -(far * near) / (far - near), 1.0)
        } else {
            (far / (near - far), (far * near) / (near - far), -1.0)
        };

        Matrix4::new(
            x,   0.0, 0.0, 0.0,
            0.0, y,   0.0, 0.0,
            0.0, 0.0, z,   z_offset,
            0.0, 0.0, w,   0.0,
        )
    }
}

//=================================
// Core Transformation Functions
//=================================

/// Performs the perspective divide on x, y and z, keeping w untouched for
/// perspective-correct interpolation later on.
#[inline]
pub fn perspective_divide(clip: &Vector4<f32>) -> Vector4<f32> {
    Vector4::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w, clip.w)
}

/// Converts NDC to raster space (origin top-left, Y down). Z passes through.
#[inline]
pub fn ndc_to_raster(ndc: &Point3<f32>, width: f32, height: f32) -> Point3<f32> {
    Point3::new(
        ((ndc.x + 1.0) / 2.0) * width,
        ((1.0 - ndc.y) / 2.0) * height,
        ndc.z,
    )
}

/// Inverse of [`ndc_to_raster`] for the x/y components.
#[inline]
pub fn raster_to_ndc(raster: &Point2<f32>, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        raster.x / width * 2.0 - 1.0,
        1.0 - raster.y / height * 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_mapping_flips_y() {
        let p = ndc_to_raster(&Point3::new(0.0, 1.0, 0.25), 100.0, 100.0);
        assert_eq!(p, Point3::new(50.0, 0.0, 0.25));

        let p = ndc_to_raster(&Point3::new(-1.0, -1.0, 0.0), 640.0, 480.0);
        assert_eq!(p, Point3::new(0.0, 480.0, 0.0));
    }

    #[test]
    fn raster_round_trip() {
        for &(x, y) in &[(0.0, 0.0), (-0.75, 0.3), (0.999, -0.999), (0.12, 0.87)] {
            let raster = ndc_to_raster(&Point3::new(x, y, 0.5), 640.0, 480.0);
            let ndc = raster_to_ndc(&Point2::new(raster.x, raster.y), 640.0, 480.0);
            assert!((ndc.x - x).abs() < 1e-5);
            assert!((ndc.y - y).abs() < 1e-5);
        }
    }

    #[test]
    fn projection_layout_follows_handedness() {
        let (near, far) = (0.1, 100.0);
        let lh = TransformFactory::projection(2.0, 1.0, near, far, true);
        let rh = TransformFactory::projection(2.0, 1.0, near, far, false);

        assert_eq!(lh[(0, 0)], 0.5);
        assert_eq!(lh[(1, 1)], 1.0);
        assert_eq!(lh[(3, 2)], 1.0);
        assert_eq!(rh[(3, 2)], -1.0);
        assert!((lh[(2, 2)] - far / (far - near)).abs() < 1e-6);
        assert!((rh[(2, 2)] - far / (near - far)).abs() < 1e-6);
        assert!((lh[(2, 3)] + far * near / (far - near)).abs() < 1e-6);
        assert!((rh[(2, 3)] - far * near / (near - far)).abs() < 1e-6);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let proj = TransformFactory::projection(1.0, 1.0, 0.1, 100.0, false);
        let near = perspective_divide(&(proj * Vector4::new(0.0, 0.0, -0.1, 1.0)));
        let far = perspective_divide(&(proj * Vector4::new(0.0, 0.0, -100.0, 1.0)));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
        assert!((near.w - 0.1).abs() < 1e-6);
        assert!((far.w - 100.0).abs() < 1e-4);
    }

    #[test]
    fn model_matrix_applies_scale_then_translation() {
        let m = TransformFactory::model(
            &Vector3::new(1.0, 2.0, 3.0),
            &Vector3::zeros(),
            &Vector3::new(2.0, 2.0, 2.0),
        );
        let p = m.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert!((p - Point3::new(3.0, 4.0, 5.0)).norm() < 1e-6);
    }
}
