use nalgebra::Vector3;

/// A light infinitely far away; rays are parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels, used as given. Diffuse shading scales
    /// with its length.
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
    pub intensity: f32,
}

impl DirectionalLight {
    /// A zero direction falls back to straight down.
    pub fn new(direction: Vector3<f32>, color: Vector3<f32>, intensity: f32) -> Self {
        let direction = if direction.norm_squared() > f32::EPSILON {
            direction
        } else {
            -Vector3::y()
        };
        Self {
            direction,
            color,
            intensity,
        }
    }

    /// Color times intensity.
    pub fn radiance(&self) -> Vector3<f32> {
        self.color * self.intensity
    }
}

impl Default for DirectionalLight {
    /// White key light from the upper front left, intensity 2.
    fn default() -> Self {
        Self {
            direction: Vector3::new(0.577, -0.577, -0.577),
            color: Vector3::new(1.0, 1.0, 1.0),
            intensity: 2.0,
        }
    }
}
