use crate::pipeline::backend::BackendKind;
use crate::scene::camera::Camera;
use crate::scene::light::DirectionalLight;
use crate::scene::scene_graph::SceneGraph;
use nalgebra::Vector3;

/// Holds all scene resources required for rendering.
pub struct RenderContext {
    pub camera: Camera,
    pub light: DirectionalLight,
    pub scene: SceneGraph,
    pub clear_color: Vector3<f32>,
    /// Backend requested by the configuration.
    pub backend: BackendKind,
}
