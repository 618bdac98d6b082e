use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// Represents a single vertex in 3D space.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    /// Position in local object space.
    pub position: Point3<f32>,
    /// Base color, used when no diffuse map is bound.
    pub color: Vector3<f32>,
    /// Texture coordinates (UV).
    pub texcoord: Vector2<f32>,
    /// Normal vector for lighting calculations.
    pub normal: Vector3<f32>,
    /// Tangent vector for normal mapping.
    pub tangent: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, texcoord: Vector2<f32>, normal: Vector3<f32>) -> Self {
        Self {
            position,
            color: Vector3::new(1.0, 1.0, 1.0),
            texcoord,
            normal,
            tangent: Vector3::zeros(),
        }
    }

    pub fn with_color(mut self, color: Vector3<f32>) -> Self {
        self.color = color;
        self
    }

    pub fn with_tangent(mut self, tangent: Vector3<f32>) -> Self {
        self.tangent = tangent;
        self
    }
}

// Tangent and color are derived data, two corners sharing position, uv and
// normal are the same vertex.
impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.texcoord == other.texcoord
            && self.normal == other.normal
    }
}

/// Attributes of one covered pixel, produced by hit-testing and
/// interpolating a projected triangle.
#[derive(Debug, Clone, Copy)]
pub struct VertexOut {
    /// Raster x/y of the pixel, interpolated depth in z and the
    /// perspective-correct w.
    pub position: Vector4<f32>,
    pub color: Vector3<f32>,
    pub uv: Vector2<f32>,
    pub normal: Vector3<f32>,
    pub tangent: Vector3<f32>,
    pub world_position: Point3<f32>,
}
