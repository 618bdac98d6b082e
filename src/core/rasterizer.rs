use crate::core::color::max_to_one;
use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::PixelShader;
use crate::core::triangle::ProjectedTriangle;
use crate::scene::camera::Camera;
use nalgebra::{Matrix4, Point2};
use std::fmt;

/// Which faces are discarded before scan conversion.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum CullMode {
    #[default]
    Back,
    Front,
    None,
}

impl CullMode {
    /// Back -> Front -> None -> Back.
    pub fn next(self) -> Self {
        match self {
            CullMode::Back => CullMode::Front,
            CullMode::Front => CullMode::None,
            CullMode::None => CullMode::Back,
        }
    }
}

impl fmt::Display for CullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CullMode::Back => "Backface",
            CullMode::Front => "Frontface",
            CullMode::None => "No culling",
        };
        f.write_str(name)
    }
}

/// What happened to a single triangle handed to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleOutcome {
    FrustumCulled,
    FaceCulled,
    Degenerate,
    Rasterized { fragments: usize },
}

/// Scan-converts projected triangles into a [`FrameBuffer`].
pub struct Rasterizer {
    pub cull_mode: CullMode,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Culls, hit-tests, depth-tests and shades one triangle.
    ///
    /// `world` is the matrix the triangle was projected with (before view and
    /// projection); it is used for face culling and for the world-space
    /// attributes handed to the shader.
    pub fn rasterize_triangle<S: PixelShader>(
        &self,
        framebuffer: &mut FrameBuffer,
        triangle: &ProjectedTriangle,
        world: &Matrix4<f32>,
        camera: &Camera,
        shader: &S,
    ) -> TriangleOutcome {
        if triangle.is_frustum_culled(camera) {
            return TriangleOutcome::FrustumCulled;
        }

        if self.is_face_culled(triangle, world, camera) {
            return TriangleOutcome::FaceCulled;
        }

        let width = framebuffer.width as f32;
        let height = framebuffer.height as f32;
        if triangle.is_degenerate(width, height) {
            return TriangleOutcome::Degenerate;
        }

        let bbox = triangle.bounding_box(width, height);
        let mut fragments = 0;

        for y in bbox.min_y..=bbox.max_y {
            for x in bbox.min_x..=bbox.max_x {
                let pixel = Point2::new(x as f32, y as f32);
                let Some(hit) = triangle.hit(pixel, width, height, self.cull_mode) else {
                    continue;
                };

                if !framebuffer.depth_test_and_update(x, y, hit.position.z) {
                    continue;
                }

                let fragment = triangle.interpolate(world, &hit);
                let view_direction = (fragment.world_position - camera.position())
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(|| -camera.local_forward());
                let color = max_to_one(shader.shade(&fragment, &view_direction));

                framebuffer.set_pixel(x, y, color);
                fragments += 1;
            }
        }

        TriangleOutcome::Rasterized { fragments }
    }

    /// Centroid-based face culling in world space.
    ///
    /// `d = (middle - camera) . normal`; back faces have `d > 0`, front faces
    /// `d < 0`.
    fn is_face_culled(
        &self,
        triangle: &ProjectedTriangle,
        world: &Matrix4<f32>,
        camera: &Camera,
    ) -> bool {
        let facing = match self.cull_mode {
            CullMode::None => return false,
            mode => mode,
        };
        let to_middle = triangle.middle(world) - camera.position();
        let d = to_middle.dot(&triangle.normal(world));
        match facing {
            CullMode::Back => d > 0.0,
            CullMode::Front => d < 0.0,
            CullMode::None => false,
        }
    }
}
