use crate::core::framebuffer::FrameBuffer;
use crate::core::rasterizer::{Rasterizer, TriangleOutcome};
use crate::pipeline::backend::{AcceleratedBackend, BackendKind};
use crate::pipeline::shaders::PhongShader;
use crate::scene::camera::Camera;
use crate::scene::light::DirectionalLight;
use crate::scene::mesh::Mesh;
use crate::scene::scene_graph::SceneGraph;
use crate::scene::texture::TextureFilter;
use log::{debug, info, warn};
use nalgebra::{Matrix4, Vector3};
use std::fmt;

/// Per-frame triangle and fragment counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub submitted: usize,
    pub frustum_culled: usize,
    pub face_culled: usize,
    pub degenerate: usize,
    pub fragments_written: usize,
}

impl FrameStats {
    fn record(&mut self, outcome: TriangleOutcome) {
        match outcome {
            TriangleOutcome::FrustumCulled => self.frustum_culled += 1,
            TriangleOutcome::FaceCulled => self.face_culled += 1,
            TriangleOutcome::Degenerate => self.degenerate += 1,
            TriangleOutcome::Rasterized { fragments } => self.fragments_written += fragments,
        }
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} triangles ({} frustum culled, {} face culled, {} degenerate), {} fragments",
            self.submitted,
            self.frustum_culled,
            self.face_culled,
            self.degenerate,
            self.fragments_written
        )
    }
}

/// Owns the render targets and drives a frame through either the software
/// rasterizer or an installed [`AcceleratedBackend`].
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
    pub clear_color: Vector3<f32>,
    pub light: DirectionalLight,
    backend: Option<Box<dyn AcceleratedBackend>>,
    active: BackendKind,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height),
            clear_color: Vector3::new(0.0, 0.0, 0.3),
            light: DirectionalLight::default(),
            backend: None,
            active: BackendKind::Software,
        }
    }

    /// Installs a backend. The renderer stays on its current path until
    /// [`Renderer::toggle_backend`] is called.
    pub fn set_backend(&mut self, backend: Box<dyn AcceleratedBackend>) {
        info!("Accelerated backend available: {}", backend.name());
        self.backend = Some(backend);
    }

    pub fn active_backend(&self) -> BackendKind {
        self.active
    }

    /// Switches between the software path and the accelerated backend.
    /// Without a backend installed this logs a warning and stays on
    /// software.
    pub fn toggle_backend(&mut self) -> BackendKind {
        self.active = match (self.active, &self.backend) {
            (BackendKind::Software, Some(_)) => BackendKind::Accelerated,
            (BackendKind::Software, None) => {
                warn!("No accelerated backend installed, staying on the software rasterizer");
                BackendKind::Software
            }
            (BackendKind::Accelerated, _) => BackendKind::Software,
        };
        info!("Now using {}", self.active);
        self.active
    }

    /// Renders one frame of `scene` as seen from `camera`.
    pub fn render(&mut self, camera: &Camera, scene: &SceneGraph) -> FrameStats {
        let stats = match (self.active, self.backend.as_deref_mut()) {
            (BackendKind::Accelerated, Some(backend)) => {
                Self::render_accelerated(backend, camera, scene, &self.clear_color)
            }
            _ => self.render_software(camera, scene),
        };
        debug!("Frame: {}", stats);
        stats
    }

    fn render_software(&mut self, camera: &Camera, scene: &SceneGraph) -> FrameStats {
        let mut stats = FrameStats::default();
        self.framebuffer.clear(self.clear_color);

        let view_projection = camera.projection() * camera.view();
        for mesh in scene.meshes() {
            let world = software_world(mesh);
            let world_view_projection = view_projection * world;
            let technique = mesh.technique();

            self.rasterizer.set_cull_mode(technique.cull);
            let shader = PhongShader::new(&self.light, &mesh.effect, TextureFilter::Nearest);

            for triangle in mesh.triangles() {
                stats.submitted += 1;
                let projected = triangle.project(&world_view_projection);
                let outcome = self.rasterizer.rasterize_triangle(
                    &mut self.framebuffer,
                    &projected,
                    &world,
                    camera,
                    &shader,
                );
                stats.record(outcome);
            }
        }

        stats
    }

    fn render_accelerated(
        backend: &mut dyn AcceleratedBackend,
        camera: &Camera,
        scene: &SceneGraph,
        clear_color: &Vector3<f32>,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        backend.begin_frame(clear_color);

        let view_projection = camera.projection() * camera.view();
        for mesh in scene.meshes() {
            let world_view_projection = view_projection * mesh.world();
            backend.draw_mesh(mesh, &world_view_projection, &mesh.technique());
            stats.submitted += mesh.triangle_count();
        }

        backend.present();
        stats
    }
}

/// World transforms are authored for the left-handed accelerated path; the
/// software path mirrors the translation along z.
fn software_world(mesh: &Mesh) -> Matrix4<f32> {
    let mut world = *mesh.world();
    world[(2, 3)] = -world[(2, 3)];
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::to_argb;
    use crate::core::geometry::Vertex;
    use crate::core::rasterizer::CullMode;
    use crate::scene::effect::{Effect, MaterialMaps, SamplerState, Technique};
    use crate::scene::texture::Texture;
    use image::{Rgb, RgbImage};
    use nalgebra::{Point3, Vector2};
    use std::sync::Arc;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SIZE: usize = 64;

    fn camera() -> Camera {
        let mut camera = Camera::new(SIZE as f32, SIZE as f32);
        camera.set_handedness(false);
        camera
    }

    fn triangle_mesh(z: f32) -> Mesh {
        let v = |x: f32, y: f32| Vertex::new(Point3::new(x, y, 0.0), Vector2::zeros(), Vector3::z());
        Mesh::new(
            vec![v(-1.0, -1.0), v(1.0, -1.0), v(0.0, 1.0)],
            vec![0, 1, 2],
            Matrix4::new_translation(&Vector3::new(0.0, 0.0, z)),
            Effect::default(),
        )
        .unwrap()
    }

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
    }

    struct RecordingBackend(Rc<RefCell<Log>>);

    impl AcceleratedBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn begin_frame(&mut self, _clear_color: &Vector3<f32>) {
            self.0.borrow_mut().calls.push("begin".into());
        }

        fn draw_mesh(&mut self, mesh: &Mesh, _wvp: &Matrix4<f32>, technique: &Technique) {
            self.0
                .borrow_mut()
                .calls
                .push(format!("draw {} {}", mesh.name, technique.name()));
        }

        fn present(&mut self) {
            self.0.borrow_mut().calls.push("present".into());
        }
    }

    #[test]
    fn empty_scene_is_cleared_to_clear_color() {
        let mut renderer = Renderer::new(SIZE, SIZE);
        let stats = renderer.render(&camera(), &SceneGraph::new());

        assert_eq!(stats, FrameStats::default());
        let clear = to_argb(Vector3::new(0.0, 0.0, 0.3));
        assert!(renderer.framebuffer.color_buffer().iter().all(|&p| p == clear));
    }

    #[test]
    fn mesh_in_front_of_camera_is_shaded() {
        let mut renderer = Renderer::new(SIZE, SIZE);
        let mut scene = SceneGraph::new();
        // Translation z is mirrored, so +5 ends up in front of a
        // right-handed camera.
        scene.add_mesh(triangle_mesh(5.0));

        let stats = renderer.render(&camera(), &scene);
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.frustum_culled, 0);
        assert_eq!(stats.face_culled, 0);
        assert!(stats.fragments_written > 0);

        let clear = to_argb(Vector3::new(0.0, 0.0, 0.3));
        let written = renderer
            .framebuffer
            .color_buffer()
            .iter()
            .filter(|&&p| p != clear)
            .count();
        assert!(written > 0);
        assert!(renderer.framebuffer.get_depth(32, 32).is_some_and(f32::is_finite));
    }

    #[test]
    fn mesh_behind_camera_is_frustum_culled() {
        let mut renderer = Renderer::new(SIZE, SIZE);
        let mut scene = SceneGraph::new();
        scene.add_mesh(triangle_mesh(-5.0));

        let stats = renderer.render(&camera(), &scene);
        assert_eq!(stats.frustum_culled, 1);
        assert_eq!(stats.fragments_written, 0);
        assert!(renderer.framebuffer.depth_buffer().iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn mesh_cull_mode_drives_the_rasterizer() {
        let mut renderer = Renderer::new(SIZE, SIZE);
        let mut scene = SceneGraph::new();
        let mut mesh = triangle_mesh(5.0);
        mesh.set_cull_mode(CullMode::Front);
        scene.add_mesh(mesh);

        let stats = renderer.render(&camera(), &scene);
        assert_eq!(stats.face_culled, 1);
        assert_eq!(stats.fragments_written, 0);
    }

    /// A lit triangle with a 2x2 checker map spread across its uvs.
    fn checker_mesh() -> Mesh {
        let mut image = RgbImage::new(2, 2);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = if (x + y) % 2 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) };
        }
        let effect = Effect::Material(MaterialMaps {
            diffuse: Some(Arc::new(Texture::from_image(image))),
            ..Default::default()
        });

        let normal = Vector3::new(-1.0, 1.0, 1.0).normalize();
        let v = |x: f32, y: f32, u: f32, t: f32| Vertex::new(Point3::new(x, y, 0.0), Vector2::new(u, t), normal);
        Mesh::new(
            vec![v(-1.0, -1.0, 0.0, 1.0), v(1.0, -1.0, 1.0, 1.0), v(0.0, 1.0, 0.5, 0.0)],
            vec![0, 1, 2],
            Matrix4::new_translation(&Vector3::new(0.0, 0.0, 3.0)),
            effect,
        )
        .unwrap()
    }

    #[test]
    fn sampler_state_does_not_change_software_output() {
        let mut scene = SceneGraph::new();
        scene.add_mesh(checker_mesh());

        let mut renderer = Renderer::new(SIZE, SIZE);
        let stats = renderer.render(&camera(), &scene);
        assert!(stats.fragments_written > 0);
        let point = renderer.framebuffer.color_buffer().to_vec();

        for state in [SamplerState::Linear, SamplerState::Anisotropic] {
            scene.meshes_mut()[0].set_sampler_state(state);
            // The backend still gets the filter the sampler asks for.
            assert_eq!(scene.meshes()[0].technique().filter, TextureFilter::Bilinear);

            renderer.render(&camera(), &scene);
            assert_eq!(renderer.framebuffer.color_buffer(), point.as_slice());
        }
    }

    #[test]
    fn toggle_without_backend_stays_on_software() {
        let mut renderer = Renderer::new(SIZE, SIZE);
        assert_eq!(renderer.toggle_backend(), BackendKind::Software);
        assert_eq!(renderer.active_backend(), BackendKind::Software);
    }

    #[test]
    fn accelerated_backend_receives_every_mesh() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut renderer = Renderer::new(SIZE, SIZE);
        renderer.set_backend(Box::new(RecordingBackend(log.clone())));
        assert_eq!(renderer.toggle_backend(), BackendKind::Accelerated);

        let mut scene = SceneGraph::new();
        scene.add_mesh(triangle_mesh(5.0).with_name("a"));
        scene.add_mesh(triangle_mesh(6.0).with_name("b"));

        let stats = renderer.render(&camera(), &scene);
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.fragments_written, 0);
        assert_eq!(
            log.borrow().calls,
            vec![
                "begin",
                "draw a PointTechniqueCullBack",
                "draw b PointTechniqueCullBack",
                "present"
            ]
        );
        // The software targets are not touched.
        assert!(renderer.framebuffer.color_buffer().iter().all(|&p| p == 0));

        assert_eq!(renderer.toggle_backend(), BackendKind::Software);
        let stats = renderer.render(&camera(), &scene);
        assert!(stats.fragments_written > 0);
    }
}
