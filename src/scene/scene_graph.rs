use crate::core::rasterizer::CullMode;
use crate::scene::effect::SamplerState;
use crate::scene::mesh::Mesh;

/// The ordered list of meshes drawn each frame.
#[derive(Debug, Default)]
pub struct SceneGraph {
    meshes: Vec<Mesh>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    /// Advances the sampler state of every mesh; returns the last new state.
    pub fn change_sampler_state(&mut self) -> Option<SamplerState> {
        self.meshes
            .iter_mut()
            .map(Mesh::change_sampler_state)
            .last()
    }

    /// Advances the cull mode of every switchable mesh; returns the last new
    /// mode, or `None` if no mesh could switch.
    pub fn change_cull_mode(&mut self) -> Option<CullMode> {
        self.meshes
            .iter_mut()
            .filter_map(Mesh::change_cull_mode)
            .last()
    }

    /// Toggles every transparent mesh; returns the last new state.
    pub fn toggle_transparency(&mut self) -> Option<bool> {
        self.meshes
            .iter_mut()
            .filter_map(Mesh::toggle_transparency)
            .last()
    }
}

impl FromIterator<Mesh> for SceneGraph {
    fn from_iter<I: IntoIterator<Item = Mesh>>(iter: I) -> Self {
        Self {
            meshes: iter.into_iter().collect(),
        }
    }
}
