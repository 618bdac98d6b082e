use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default = "default_meshes")]
    pub meshes: Vec<MeshConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            meshes: default_meshes(),
        }
    }
}

/// The vehicle with its four maps, and the exhaust flame behind it.
fn default_meshes() -> Vec<MeshConfig> {
    vec![
        MeshConfig {
            name: Some("vehicle".to_string()),
            path: "resources/vehicle.obj".to_string(),
            position: [0.0, 0.0, 40.0],
            rotation: [0.0, 0.0, 0.0],
            scale: default_scale(),
            diffuse: Some("resources/vehicle_diffuse.png".to_string()),
            normal: Some("resources/vehicle_normal.png".to_string()),
            specular: Some("resources/vehicle_specular.png".to_string()),
            gloss: Some("resources/vehicle_gloss.png".to_string()),
            transparent: false,
            cull_mode: None,
            can_switch_cull_mode: true,
        },
        MeshConfig {
            name: Some("exhaust".to_string()),
            path: "resources/fireFX.obj".to_string(),
            position: [0.0, 0.0, 40.0],
            rotation: [0.0, 0.0, 0.0],
            scale: default_scale(),
            diffuse: Some("resources/fireFX_diffuse.png".to_string()),
            normal: None,
            specular: None,
            gloss: None,
            transparent: true,
            cull_mode: Some("none".to_string()),
            can_switch_cull_mode: false,
        },
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    // --- Output ---
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_target_fps")]
    pub target_fps: usize,

    // --- Pipeline ---
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
    #[serde(default = "default_backend")]
    pub backend: String, // "software", "accelerated"
    #[serde(default = "default_sampler")]
    pub sampler: String, // "point", "linear", "anisotropic"
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            output: default_output(),
            target_fps: default_target_fps(),
            clear_color: default_clear_color(),
            backend: default_backend(),
            sampler: default_sampler(),
        }
    }
}

fn default_width() -> usize {
    640
}
fn default_height() -> usize {
    480
}
fn default_output() -> String {
    "output.png".to_string()
}
fn default_target_fps() -> usize {
    60
}
fn default_clear_color() -> [f32; 3] {
    [0.0, 0.0, 0.3]
}
fn default_backend() -> String {
    "software".to_string()
}
fn default_sampler() -> String {
    "point".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_forward")]
    pub forward: [f32; 3],
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Radians per second.
    #[serde(default = "default_fov_speed")]
    pub fov_speed: f32,
    /// Radians per pixel of pointer motion.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            forward: default_forward(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            move_speed: default_move_speed(),
            fov_speed: default_fov_speed(),
            sensitivity: default_sensitivity(),
        }
    }
}

fn default_forward() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}
fn default_fov() -> f32 {
    90.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    100.0
}
fn default_move_speed() -> f32 {
    10.0
}
fn default_fov_speed() -> f32 {
    3.0
}
fn default_sensitivity() -> f32 {
    0.01
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightConfig {
    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],
    #[serde(default = "default_light_color")]
    pub color: [f32; 3],
    #[serde(default = "default_light_intensity")]
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
            color: default_light_color(),
            intensity: default_light_intensity(),
        }
    }
}

fn default_light_direction() -> [f32; 3] {
    [0.577, -0.577, -0.577]
}
fn default_light_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_light_intensity() -> f32 {
    2.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeshConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub path: String,

    // --- Transform ---
    #[serde(default)]
    pub position: [f32; 3],
    /// Degrees.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],

    // --- Maps ---
    pub diffuse: Option<String>,
    pub normal: Option<String>,
    pub specular: Option<String>,
    pub gloss: Option<String>,

    // --- Effect ---
    #[serde(default)]
    pub transparent: bool,
    pub cull_mode: Option<String>, // "back", "front", "none"
    #[serde(default = "default_true")]
    pub can_switch_cull_mode: bool,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_true() -> bool {
    true
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses a TOML document. Zero render dimensions are rejected.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        let (width, height) = (config.render.width, config.render.height);
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(config)
    }
}
