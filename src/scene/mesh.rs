use crate::core::geometry::Vertex;
use crate::core::math::interpolation::cross_2d;
use crate::core::rasterizer::CullMode;
use crate::core::triangle::Triangle;
use crate::error::{Error, Result};
use crate::scene::effect::{Effect, SamplerState, Technique};
use nalgebra::{Matrix4, Vector2, Vector3};
use std::collections::HashMap;

/// An indexed triangle list with its world transform and render state.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    world: Matrix4<f32>,
    pub effect: Effect,
    cull_mode: CullMode,
    can_switch_cull_mode: bool,
    sampler_state: SamplerState,
}

impl Mesh {
    /// Validates the index buffer: its length must be a multiple of 3 and
    /// every index must address a vertex.
    pub fn new(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        world: Matrix4<f32>,
        effect: Effect,
    ) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(Error::IndexCount(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(Error::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }

        Ok(Self {
            name: String::new(),
            vertices,
            indices,
            world,
            effect,
            cull_mode: CullMode::Back,
            can_switch_cull_mode: true,
            sampler_state: SamplerState::Point,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Pins the mesh to `mode`; [`Mesh::change_cull_mode`] becomes a no-op.
    pub fn with_locked_cull_mode(mut self, mode: CullMode) -> Self {
        self.cull_mode = mode;
        self.can_switch_cull_mode = false;
        self
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles in index order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            Triangle::new(
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            )
        })
    }

    pub fn world(&self) -> &Matrix4<f32> {
        &self.world
    }

    pub fn set_world(&mut self, world: Matrix4<f32>) {
        self.world = world;
    }

    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    pub fn can_switch_cull_mode(&self) -> bool {
        self.can_switch_cull_mode
    }

    /// Advances to the next cull mode. Returns `None` when the mode is locked.
    pub fn change_cull_mode(&mut self) -> Option<CullMode> {
        if !self.can_switch_cull_mode {
            return None;
        }
        self.cull_mode = self.cull_mode.next();
        Some(self.cull_mode)
    }

    pub fn sampler_state(&self) -> SamplerState {
        self.sampler_state
    }

    pub fn set_sampler_state(&mut self, state: SamplerState) {
        self.sampler_state = state;
    }

    pub fn change_sampler_state(&mut self) -> SamplerState {
        self.sampler_state = self.sampler_state.next();
        self.sampler_state
    }

    pub fn toggle_transparency(&mut self) -> Option<bool> {
        self.effect.toggle_transparency()
    }

    pub fn technique(&self) -> Technique {
        Technique::lookup(self.sampler_state, self.cull_mode, self.effect.transparency())
    }
}

/// Bit patterns of position, uv and normal: the identity of a vertex.
type VertexKey = [u32; 8];

fn vertex_key(v: &Vertex) -> VertexKey {
    [
        v.position.x.to_bits(),
        v.position.y.to_bits(),
        v.position.z.to_bits(),
        v.texcoord.x.to_bits(),
        v.texcoord.y.to_bits(),
        v.normal.x.to_bits(),
        v.normal.y.to_bits(),
        v.normal.z.to_bits(),
    ]
}

/// Accumulates triangles into a de-duplicated vertex/index buffer pair and
/// generates per-vertex tangents from uv gradients.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    lookup: HashMap<VertexKey, u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Adds a triangle, computing its tangent and rejecting it against each
    /// corner normal. Corners equal to an earlier vertex reuse its index and
    /// add to its tangent.
    pub fn push_triangle(&mut self, corners: [Vertex; 3]) {
        let tangent = face_tangent(&corners);
        for corner in corners {
            let index = self.push_vertex(corner.with_tangent(reject(tangent, corner.normal)));
            self.indices.push(index);
        }
    }

    fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        let key = vertex_key(&vertex);
        if let Some(&index) = self.lookup.get(&key) {
            self.vertices[index as usize].tangent += vertex.tangent;
            return index;
        }
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        self.lookup.insert(key, index);
        index
    }

    /// Normalizes the accumulated tangents and returns the buffers.
    pub fn finish(mut self) -> (Vec<Vertex>, Vec<u32>) {
        for v in &mut self.vertices {
            v.tangent = v
                .tangent
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::zeros);
        }
        (self.vertices, self.indices)
    }

    pub fn build(self, world: Matrix4<f32>, effect: Effect) -> Result<Mesh> {
        let (vertices, indices) = self.finish();
        Mesh::new(vertices, indices, world, effect)
    }
}

/// Tangent along +u from position and uv deltas; zero when the uv mapping
/// of the face is degenerate.
fn face_tangent(corners: &[Vertex; 3]) -> Vector3<f32> {
    let [v0, v1, v2] = corners;
    let edge0 = v1.position - v0.position;
    let edge1 = v2.position - v0.position;
    let diff_x = Vector2::new(v1.texcoord.x - v0.texcoord.x, v2.texcoord.x - v0.texcoord.x);
    let diff_y = Vector2::new(v1.texcoord.y - v0.texcoord.y, v2.texcoord.y - v0.texcoord.y);

    let det = cross_2d(&diff_x, &diff_y);
    if det.abs() < f32::EPSILON {
        return Vector3::zeros();
    }
    (edge0 * diff_y.y - edge1 * diff_y.x) / det
}

/// Gram-Schmidt: the part of `tangent` orthogonal to `normal`, normalized.
fn reject(tangent: Vector3<f32>, normal: Vector3<f32>) -> Vector3<f32> {
    let n2 = normal.norm_squared();
    let orthogonal = if n2 > f32::EPSILON {
        tangent - normal * (tangent.dot(&normal) / n2)
    } else {
        tangent
    };
    orthogonal
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}
