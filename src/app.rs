use crate::error::Result;
use crate::io::config::Config;
use crate::io::image::{save_buffer_to_image, screenshot_path};
use crate::pipeline::backend::BackendKind;
use crate::pipeline::renderer::{FrameStats, Renderer};
use crate::scene::context::RenderContext;
use crate::scene::loader::{build_renderer, init_scene_resources};
use crate::ui::input::{Action, CONTROLS, camera_input, pressed_actions};
use log::{info, warn};
use minifb::{Key, Window, WindowOptions};
use std::path::Path;
use std::time::Instant;

/// Runs the application in GUI mode with real-time rendering and interactivity.
pub fn run_gui(config: Config) -> Result<()> {
    let width = config.render.width;
    let height = config.render.height;

    info!("Starting GUI mode ({}x{})...", width, height);
    println!("{}", CONTROLS);

    let mut window = Window::new(
        "Software Rasterizer",
        width,
        height,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(config.render.target_fps);

    let mut context = init_scene_resources(&config);
    let mut renderer = build_renderer(&context, width, height);
    context
        .camera
        .set_handedness(renderer.active_backend() == BackendKind::Accelerated);

    let mut last_frame_time = Instant::now();
    let mut last_fps_update = Instant::now();
    let mut frame_count = 0;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let now = Instant::now();
        let dt = (now - last_frame_time).as_secs_f32();
        last_frame_time = now;

        for action in pressed_actions(&window) {
            handle_action(action, &mut context, &mut renderer)?;
        }

        context.camera.update(&camera_input(&window), dt);
        renderer.render(&context.camera, &context.scene);

        window.update_with_buffer(renderer.framebuffer.color_buffer(), width, height)?;

        frame_count += 1;
        let elapsed = last_fps_update.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            let fps = frame_count as f32 / elapsed;
            info!("FPS: {:.1}", fps);
            window.set_title(&format!(
                "Software Rasterizer - {} - {:.1} FPS - FOV: {:.1}",
                renderer.active_backend(),
                fps,
                context.camera.fov_angle().to_degrees()
            ));
            frame_count = 0;
            last_fps_update = Instant::now();
        }
    }

    Ok(())
}

fn handle_action(action: Action, context: &mut RenderContext, renderer: &mut Renderer) -> Result<()> {
    match action {
        Action::ToggleBackend => {
            let kind = renderer.toggle_backend();
            context.camera.set_handedness(kind == BackendKind::Accelerated);
        }
        Action::CycleSampler => match context.scene.change_sampler_state() {
            Some(state) => info!("Sampler state: {}", state),
            None => warn!("No meshes to change the sampler state of"),
        },
        Action::CycleCullMode => match context.scene.change_cull_mode() {
            Some(mode) => info!("Cull mode: {}", mode),
            None => warn!("No mesh allows switching its cull mode"),
        },
        Action::ToggleTransparency => match context.scene.toggle_transparency() {
            Some(enabled) => info!("Transparency: {}", if enabled { "on" } else { "off" }),
            None => warn!("No transparent meshes in the scene"),
        },
        Action::Screenshot => save_frame(renderer, &screenshot_path())?,
    }
    Ok(())
}

fn save_frame(renderer: &Renderer, path: &Path) -> Result<()> {
    let framebuffer = &renderer.framebuffer;
    save_buffer_to_image(
        framebuffer.color_buffer(),
        framebuffer.width,
        framebuffer.height,
        path,
    )
}

/// Runs the application headless: renders `frames` frames and writes the
/// last one to the configured output path.
pub fn run_cli(config: Config, frames: usize) -> Result<FrameStats> {
    info!("Starting CLI mode...");
    let context = init_scene_resources(&config);
    let mut renderer = build_renderer(&context, config.render.width, config.render.height);

    let mut camera = context.camera;
    camera.set_handedness(renderer.active_backend() == BackendKind::Accelerated);

    let start_time = Instant::now();
    let mut stats = FrameStats::default();
    for _ in 0..frames.max(1) {
        stats = renderer.render(&camera, &context.scene);
    }
    info!(
        "Rendered {} frame(s) in {:.2?}: {}",
        frames.max(1),
        start_time.elapsed(),
        stats
    );

    info!("Saving output to '{}'...", config.render.output);
    save_frame(&renderer, Path::new(&config.render.output))?;
    info!("Done.");
    Ok(stats)
}
