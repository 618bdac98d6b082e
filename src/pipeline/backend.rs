use crate::scene::effect::Technique;
use crate::scene::mesh::Mesh;
use nalgebra::{Matrix4, Vector3};

/// A hardware (or otherwise external) rasterizer the renderer can hand whole
/// meshes to instead of scan-converting them itself.
///
/// Called once per frame as `begin_frame`, `draw_mesh` for every mesh in
/// scene order, then `present`. Implementations own their own targets; the
/// software framebuffer is left untouched while a backend is active.
pub trait AcceleratedBackend {
    fn name(&self) -> &str;

    fn begin_frame(&mut self, clear_color: &Vector3<f32>);

    fn draw_mesh(&mut self, mesh: &Mesh, world_view_projection: &Matrix4<f32>, technique: &Technique);

    fn present(&mut self);
}

/// Which path [`crate::pipeline::renderer::Renderer::render`] takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Software,
    Accelerated,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Software => f.write_str("Software Rasterizer"),
            BackendKind::Accelerated => f.write_str("Accelerated"),
        }
    }
}
