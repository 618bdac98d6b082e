use crate::core::math::transform::TransformFactory;
use crate::core::rasterizer::CullMode;
use crate::error::Result;
use crate::io::config::{CameraConfig, Config, LightConfig, MeshConfig};
use crate::io::obj_loader::load_obj;
use crate::pipeline::backend::BackendKind;
use crate::pipeline::renderer::Renderer;
use crate::scene::camera::Camera;
use crate::scene::context::RenderContext;
use crate::scene::effect::{Effect, MaterialMaps, SamplerState};
use crate::scene::light::DirectionalLight;
use crate::scene::mesh::Mesh;
use crate::scene::scene_graph::SceneGraph;
use crate::scene::texture::Texture;
use log::{error, info, warn};
use nalgebra::{Point3, Vector3};
use std::sync::Arc;

pub fn parse_cull_mode(name: &str) -> Option<CullMode> {
    match name.to_ascii_lowercase().as_str() {
        "back" => Some(CullMode::Back),
        "front" => Some(CullMode::Front),
        "none" => Some(CullMode::None),
        _ => None,
    }
}

pub fn parse_sampler(name: &str) -> Option<SamplerState> {
    match name.to_ascii_lowercase().as_str() {
        "point" => Some(SamplerState::Point),
        "linear" => Some(SamplerState::Linear),
        "anisotropic" => Some(SamplerState::Anisotropic),
        _ => None,
    }
}

pub fn parse_backend(name: &str) -> Option<BackendKind> {
    match name.to_ascii_lowercase().as_str() {
        "software" => Some(BackendKind::Software),
        "accelerated" => Some(BackendKind::Accelerated),
        _ => None,
    }
}

pub fn build_camera(config: &CameraConfig, width: usize, height: usize) -> Camera {
    let mut camera = Camera::with_params(
        width as f32,
        height as f32,
        Point3::from(config.position),
        Vector3::from(config.forward),
        config.fov.to_radians(),
        config.near,
        config.far,
    );
    camera.move_speed = config.move_speed;
    camera.fov_speed = config.fov_speed;
    camera.sensitivity = config.sensitivity;
    camera
}

pub fn build_light(config: &LightConfig) -> DirectionalLight {
    DirectionalLight::new(
        Vector3::from(config.direction),
        Vector3::from(config.color),
        config.intensity,
    )
}

/// Loads an optional texture map. A map that fails to load is dropped with
/// a warning, the mesh then shades without it.
fn load_map(path: Option<&str>, kind: &str) -> Option<Arc<Texture>> {
    let path = path?;
    match Texture::load(path) {
        Ok(texture) => Some(Arc::new(texture)),
        Err(e) => {
            warn!("Failed to load {} map '{}': {}", kind, path, e);
            None
        }
    }
}

fn build_effect(config: &MeshConfig) -> Effect {
    let diffuse = load_map(config.diffuse.as_deref(), "diffuse");
    if config.transparent {
        return Effect::transparent(diffuse);
    }
    Effect::Material(MaterialMaps {
        diffuse,
        normal: load_map(config.normal.as_deref(), "normal"),
        specular: load_map(config.specular.as_deref(), "specular"),
        glossiness: load_map(config.gloss.as_deref(), "gloss"),
    })
}

/// Loads one configured mesh with its maps, transform and render state.
pub fn build_mesh(config: &MeshConfig, sampler: SamplerState) -> Result<Mesh> {
    let world = TransformFactory::model(
        &Vector3::from(config.position),
        &Vector3::from(config.rotation),
        &Vector3::from(config.scale),
    );
    let mut mesh = load_obj(&config.path)?
        .build(world, build_effect(config))?
        .with_name(config.name.clone().unwrap_or_else(|| config.path.clone()));

    let cull_mode = match config.cull_mode.as_deref() {
        Some(name) => parse_cull_mode(name).unwrap_or_else(|| {
            warn!("Unknown cull mode '{}' for '{}', using back", name, mesh.name);
            CullMode::Back
        }),
        None => CullMode::Back,
    };
    if config.can_switch_cull_mode {
        mesh.set_cull_mode(cull_mode);
    } else {
        mesh = mesh.with_locked_cull_mode(cull_mode);
    }
    mesh.set_sampler_state(sampler);

    info!(
        "Mesh '{}': {} triangles, {}",
        mesh.name,
        mesh.triangle_count(),
        mesh.technique().name()
    );
    Ok(mesh)
}

/// Initial resource loading (heavy I/O). Meshes that fail to load are
/// logged and left out of the scene.
pub fn init_scene_resources(config: &Config) -> RenderContext {
    let render = &config.render;

    let sampler = parse_sampler(&render.sampler).unwrap_or_else(|| {
        warn!("Unknown sampler '{}', using point", render.sampler);
        SamplerState::Point
    });
    let backend = parse_backend(&render.backend).unwrap_or_else(|| {
        warn!("Unknown backend '{}', using software", render.backend);
        BackendKind::Software
    });

    let mut scene = SceneGraph::new();
    for mesh_config in &config.meshes {
        match build_mesh(mesh_config, sampler) {
            Ok(mesh) => scene.add_mesh(mesh),
            Err(e) => error!("Error loading mesh '{}': {}", mesh_config.path, e),
        }
    }

    info!(
        "Scene initialized with {} meshes ({} triangles).",
        scene.len(),
        scene.triangle_count()
    );

    RenderContext {
        camera: build_camera(&config.camera, render.width, render.height),
        light: build_light(&config.light),
        scene,
        clear_color: Vector3::from(render.clear_color),
        backend,
    }
}

/// Creates a renderer matching the context's light and clear color.
pub fn build_renderer(context: &RenderContext, width: usize, height: usize) -> Renderer {
    let mut renderer = Renderer::new(width, height);
    renderer.clear_color = context.clear_color;
    renderer.light = context.light;
    if context.backend == BackendKind::Accelerated {
        renderer.toggle_backend();
    }
    renderer
}
