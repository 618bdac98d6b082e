//! Per-primitive setup: projection, frustum culling, hit-testing and
//! perspective-correct attribute interpolation.
//!
//! A [`Triangle`] only holds its input vertices. Calling [`Triangle::project`]
//! is the only way to obtain a [`ProjectedTriangle`], which is where every
//! operation depending on clip-space data lives.

use crate::core::geometry::{Vertex, VertexOut};
use crate::core::math::interpolation::{
    EPSILON, cross_2d, perspective_interpolate, reciprocal_interpolate,
};
use crate::core::math::transform::{ndc_to_raster, perspective_divide};
use crate::core::rasterizer::CullMode;
use crate::scene::camera::Camera;
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

/// Three input vertices of one primitive, in object space.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    vertices: [Vertex; 3],
}

/// A triangle after the world-view-projection transform and perspective
/// divide: x, y, z are NDC, w is the untouched clip w.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedTriangle {
    triangle: Triangle,
    projected: [Vector4<f32>; 3],
}

/// Result of a successful hit test.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Barycentric weights of v0, v1, v2. Non-negative and summing to 1.
    pub weights: Vector3<f32>,
    /// Pixel x, y, reconstructed depth and reconstructed w.
    pub position: Vector4<f32>,
}

/// Inclusive pixel range covered by a triangle, clamped to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    pub fn vertices(&self) -> &[Vertex; 3] {
        &self.vertices
    }

    /// Transforms every vertex into clip space and divides x, y, z by w.
    pub fn project(self, world_view_projection: &Matrix4<f32>) -> ProjectedTriangle {
        let projected = self
            .vertices
            .map(|v| perspective_divide(&(world_view_projection * v.position.to_homogeneous())));
        ProjectedTriangle {
            triangle: self,
            projected,
        }
    }

    /// Unnormalized face normal `(p1 - p0) x (p2 - p0)` in world space.
    pub fn normal(&self, world: &Matrix4<f32>) -> Vector3<f32> {
        let [p0, p1, p2] = self.world_positions(world);
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Centroid in world space.
    pub fn middle(&self, world: &Matrix4<f32>) -> Point3<f32> {
        let [p0, p1, p2] = self.world_positions(world);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    fn world_positions(&self, world: &Matrix4<f32>) -> [Point3<f32>; 3] {
        self.vertices.map(|v| world.transform_point(&v.position))
    }
}

impl ProjectedTriangle {
    pub fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    /// Projected vertices: NDC x, y, z and clip w.
    pub fn projected(&self) -> &[Vector4<f32>; 3] {
        &self.projected
    }

    pub fn normal(&self, world: &Matrix4<f32>) -> Vector3<f32> {
        self.triangle.normal(world)
    }

    pub fn middle(&self, world: &Matrix4<f32>) -> Point3<f32> {
        self.triangle.middle(world)
    }

    /// True if any vertex lies outside the NDC x/y range or its w fails the
    /// camera's near/far test. The triangle is rejected as a whole, there is
    /// no clipping.
    pub fn is_frustum_culled(&self, camera: &Camera) -> bool {
        self.projected.iter().any(|p| {
            p.x < -1.0 || p.x > 1.0 || p.y < -1.0 || p.y > 1.0 || camera.frustum_cull(p.w)
        })
    }

    /// Raster-space positions of the three vertices.
    pub fn raster_coords(&self, width: f32, height: f32) -> [Point2<f32>; 3] {
        self.projected.map(|p| {
            let raster = ndc_to_raster(&Point3::new(p.x, p.y, p.z), width, height);
            Point2::new(raster.x, raster.y)
        })
    }

    /// True when the raster-space triangle has (near) zero area and can
    /// never produce a hit.
    pub fn is_degenerate(&self, width: f32, height: f32) -> bool {
        let [p0, p1, p2] = self.raster_coords(width, height);
        cross_2d(&(p0 - p1), &(p0 - p2)).abs() < EPSILON
    }

    /// Point-in-triangle test with barycentric weights.
    ///
    /// The pixel is inside when the three edge cross products all share the
    /// sign of the accepted winding: `<= 0` for back-face culling, `>= 0` for
    /// front-face culling (equivalent to negating every edge), either for
    /// `CullMode::None`. Returns `None` outside or for a zero-area triangle.
    pub fn hit(
        &self,
        pixel: Point2<f32>,
        width: f32,
        height: f32,
        cull_mode: CullMode,
    ) -> Option<Hit> {
        let [p0, p1, p2] = self.raster_coords(width, height);

        let area = cross_2d(&(p0 - p1), &(p0 - p2));
        if area.abs() < EPSILON {
            return None;
        }

        let edge_a = p1 - p0;
        let edge_b = p2 - p1;
        let edge_c = p0 - p2;

        let w2 = cross_2d(&edge_a, &(pixel - p0));
        let w0 = cross_2d(&edge_b, &(pixel - p1));
        let w1 = cross_2d(&edge_c, &(pixel - p2));

        let clockwise = w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0;
        let counter_clockwise = w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0;
        let inside = match cull_mode {
            CullMode::Back => clockwise,
            CullMode::Front => counter_clockwise,
            CullMode::None => clockwise || counter_clockwise,
        };
        if !inside {
            return None;
        }

        let weights = Vector3::new(w0, w1, w2) / area;
        let z = reciprocal_interpolate(self.projected.map(|p| p.z), &weights);
        let w = reciprocal_interpolate(self.projected.map(|p| p.w), &weights);

        Some(Hit {
            weights,
            position: Vector4::new(pixel.x, pixel.y, z, w),
        })
    }

    /// Screen-clamped pixel bounds of the raster-space triangle.
    pub fn bounding_box(&self, width: f32, height: f32) -> BoundingBox {
        let [p0, p1, p2] = self.raster_coords(width, height);
        let clamp_x = |v: f32| v.clamp(0.0, width - 1.0) as usize;
        let clamp_y = |v: f32| v.clamp(0.0, height - 1.0) as usize;

        BoundingBox {
            min_x: clamp_x(p0.x.min(p1.x).min(p2.x)),
            min_y: clamp_y(p0.y.min(p1.y).min(p2.y)),
            max_x: clamp_x(p0.x.max(p1.x).max(p2.x)),
            max_y: clamp_y(p0.y.max(p1.y).max(p2.y)),
        }
    }

    /// Perspective-correct attributes at a hit. Positions, normals and
    /// tangents are taken to world space first; normal and tangent are
    /// re-normalized after blending.
    pub fn interpolate(&self, world: &Matrix4<f32>, hit: &Hit) -> VertexOut {
        let vertices = &self.triangle.vertices;
        let vertex_w = self.projected.map(|p| p.w);
        let pixel_w = hit.position.w;
        let weights = &hit.weights;

        let world_positions = vertices.map(|v| world.transform_point(&v.position).coords);
        let normals = vertices.map(|v| world.transform_vector(&v.normal));
        let tangents = vertices.map(|v| world.transform_vector(&v.tangent));

        let world_position = perspective_interpolate(world_positions, vertex_w, weights, pixel_w);
        let uv = perspective_interpolate(vertices.map(|v| v.texcoord), vertex_w, weights, pixel_w);
        let color = perspective_interpolate(vertices.map(|v| v.color), vertex_w, weights, pixel_w);
        let normal = perspective_interpolate(normals, vertex_w, weights, pixel_w);
        let tangent = perspective_interpolate(tangents, vertex_w, weights, pixel_w);

        VertexOut {
            position: hit.position,
            color,
            uv,
            normal: normal.try_normalize(f32::EPSILON).unwrap_or(normal),
            tangent: tangent.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros),
            world_position: Point3::from(world_position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::new(Point3::new(x, y, z), Vector2::zeros(), Vector3::z())
    }

    /// With an identity transform positions come out unchanged as NDC (w = 1).
    fn ndc_triangle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> ProjectedTriangle {
        Triangle::new(vertex(a.0, a.1, 0.5), vertex(b.0, b.1, 0.5), vertex(c.0, c.1, 0.5))
            .project(&Matrix4::identity())
    }

    #[test]
    fn unit_triangle_maps_to_expected_raster_vertices() {
        let tri = ndc_triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
        let raster = tri.raster_coords(100.0, 100.0);
        assert_eq!(raster[0], Point2::new(50.0, 50.0));
        assert_eq!(raster[1], Point2::new(100.0, 50.0));
        assert_eq!(raster[2], Point2::new(50.0, 0.0));
    }

    #[test]
    fn interior_pixel_hits_with_normalized_weights() {
        let tri = ndc_triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
        let hit = tri
            .hit(Point2::new(60.0, 45.0), 100.0, 100.0, CullMode::Back)
            .expect("pixel inside the triangle");

        assert!((hit.weights.sum() - 1.0).abs() < 1e-5);
        assert!(hit.weights.iter().all(|&w| w >= 0.0));
        assert!((hit.weights.x - 0.7).abs() < 1e-5);
        assert!((hit.weights.y - 0.2).abs() < 1e-5);
        assert!((hit.weights.z - 0.1).abs() < 1e-5);
        assert!((hit.position.z - 0.5).abs() < 1e-5);
        assert!((hit.position.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn exterior_pixels_miss() {
        let tri = ndc_triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
        for pixel in [
            Point2::new(10.0, 10.0),
            Point2::new(60.0, 55.0),
            Point2::new(99.0, 1.0),
        ] {
            assert!(tri.hit(pixel, 100.0, 100.0, CullMode::Back).is_none());
        }
    }

    #[test]
    fn winding_selection_follows_cull_mode() {
        let ccw = ndc_triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
        let cw = ndc_triangle((0.0, 0.0), (0.0, 1.0), (1.0, 0.0));
        let pixel = Point2::new(60.0, 45.0);

        assert!(ccw.hit(pixel, 100.0, 100.0, CullMode::Back).is_some());
        assert!(ccw.hit(pixel, 100.0, 100.0, CullMode::Front).is_none());
        assert!(cw.hit(pixel, 100.0, 100.0, CullMode::Back).is_none());

        let front = cw
            .hit(pixel, 100.0, 100.0, CullMode::Front)
            .expect("reversed winding accepted under front-face culling");
        assert!(front.weights.iter().all(|&w| w >= 0.0));
        assert!((front.weights.sum() - 1.0).abs() < 1e-5);

        assert!(ccw.hit(pixel, 100.0, 100.0, CullMode::None).is_some());
        assert!(cw.hit(pixel, 100.0, 100.0, CullMode::None).is_some());
    }

    #[test]
    fn degenerate_triangle_never_hits() {
        let tri = ndc_triangle((0.0, 0.0), (0.5, 0.5), (1.0, 1.0));
        assert!(tri.is_degenerate(100.0, 100.0));
        let bbox = tri.bounding_box(100.0, 100.0);
        for y in bbox.min_y..=bbox.max_y {
            for x in bbox.min_x..=bbox.max_x {
                let pixel = Point2::new(x as f32, y as f32);
                assert!(tri.hit(pixel, 100.0, 100.0, CullMode::None).is_none());
            }
        }
    }

    #[test]
    fn bounding_box_is_clamped_to_screen() {
        let tri = ndc_triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
        assert_eq!(
            tri.bounding_box(100.0, 100.0),
            BoundingBox {
                min_x: 50,
                min_y: 0,
                max_x: 99,
                max_y: 50,
            }
        );
    }

    #[test]
    fn frustum_culling_rejects_vertices_outside_ndc_or_depth_range() {
        let mut camera = Camera::new(100.0, 100.0);
        camera.set_handedness(false);

        // w = 1 is inside [0.1, 100].
        let inside = ndc_triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
        assert!(!inside.is_frustum_culled(&camera));

        let outside_x = ndc_triangle((0.0, 0.0), (1.5, 0.0), (0.0, 1.0));
        assert!(outside_x.is_frustum_culled(&camera));

        let behind = Triangle::new(vertex(0.0, 0.0, 1.0), vertex(0.1, 0.0, 1.0), vertex(0.0, 0.1, 1.0))
            .project(&(camera.projection() * camera.view()));
        assert!(behind.is_frustum_culled(&camera));
    }

    #[test]
    fn interpolation_reproduces_vertex_attributes() {
        let mut camera = Camera::new(200.0, 100.0);
        camera.set_handedness(false);
        let wvp = camera.projection() * camera.view();

        let v0 = Vertex::new(Point3::new(-1.0, -1.0, -3.0), Vector2::new(0.0, 0.0), Vector3::x())
            .with_color(Vector3::new(1.0, 0.0, 0.0));
        let v1 = Vertex::new(Point3::new(2.0, -1.0, -6.0), Vector2::new(1.0, 0.0), Vector3::y())
            .with_color(Vector3::new(0.0, 1.0, 0.0));
        let v2 = Vertex::new(Point3::new(0.0, 1.5, -4.0), Vector2::new(0.0, 1.0), Vector3::z())
            .with_color(Vector3::new(0.0, 0.0, 1.0));
        let tri = Triangle::new(v0, v1, v2).project(&wvp);
        assert!(!tri.is_frustum_culled(&camera));

        let raster = tri.raster_coords(200.0, 100.0);
        for (i, expected) in [v0, v1, v2].iter().enumerate() {
            let hit = tri
                .hit(raster[i], 200.0, 100.0, CullMode::None)
                .expect("vertex position lies on the triangle");
            let out = tri.interpolate(&Matrix4::identity(), &hit);

            assert!((out.uv - expected.texcoord).norm() < 1e-4);
            assert!((out.normal - expected.normal).norm() < 1e-4);
            assert!((out.color - expected.color).norm() < 1e-4);
            assert!((out.world_position - expected.position).norm() < 1e-3);
            assert!((out.position.w - tri.projected()[i].w).abs() < 1e-3);
        }
    }

    #[test]
    fn face_normal_and_middle_use_world_transform() {
        let tri = Triangle::new(vertex(0.0, 0.0, 0.0), vertex(1.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0));
        let world = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -5.0));

        assert_eq!(tri.normal(&world), Vector3::new(0.0, 0.0, 1.0));
        let middle = tri.middle(&world);
        assert!((middle - Point3::new(1.0 / 3.0, 1.0 / 3.0, -5.0)).norm() < 1e-6);
    }
}
