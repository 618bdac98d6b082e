use crate::core::rasterizer::CullMode;
use crate::scene::texture::{Texture, TextureFilter};
use std::fmt;
use std::sync::Arc;

/// Texture sampler selection, cycled at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerState {
    #[default]
    Point,
    Linear,
    Anisotropic,
}

impl SamplerState {
    /// Point -> Linear -> Anisotropic -> Point.
    pub fn next(self) -> Self {
        match self {
            SamplerState::Point => SamplerState::Linear,
            SamplerState::Linear => SamplerState::Anisotropic,
            SamplerState::Anisotropic => SamplerState::Point,
        }
    }

    /// Filter an accelerated backend should bind. Anisotropic falls back to
    /// bilinear.
    pub fn filter(self) -> TextureFilter {
        match self {
            SamplerState::Point => TextureFilter::Nearest,
            SamplerState::Linear | SamplerState::Anisotropic => TextureFilter::Bilinear,
        }
    }
}

impl fmt::Display for SamplerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SamplerState::Point => "Point",
            SamplerState::Linear => "Linear",
            SamplerState::Anisotropic => "Anisotropic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    AlphaBlend,
}

/// Resolved render state for one mesh: what an accelerated backend needs to
/// pick a pipeline. The software path reads only `cull` and always samples
/// nearest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Technique {
    pub sampler: SamplerState,
    pub filter: TextureFilter,
    pub cull: CullMode,
    pub blend: BlendMode,
}

impl Technique {
    /// `transparency` is `None` for effects that cannot blend, otherwise the
    /// current toggle.
    pub fn lookup(sampler: SamplerState, cull: CullMode, transparency: Option<bool>) -> Self {
        let blend = match transparency {
            Some(true) => BlendMode::AlphaBlend,
            Some(false) | None => BlendMode::Opaque,
        };
        Self {
            sampler,
            filter: sampler.filter(),
            cull,
            blend,
        }
    }

    /// Stable technique name, e.g. `LinearTechniqueCullBack`.
    pub fn name(&self) -> String {
        let cull = match self.cull {
            CullMode::Back => "CullBack",
            CullMode::Front => "CullFront",
            CullMode::None => "CullNone",
        };
        format!("{}Technique{}", self.sampler, cull)
    }
}

/// The four optional maps of an opaque, lit surface.
#[derive(Debug, Clone, Default)]
pub struct MaterialMaps {
    pub diffuse: Option<Arc<Texture>>,
    pub normal: Option<Arc<Texture>>,
    pub specular: Option<Arc<Texture>>,
    pub glossiness: Option<Arc<Texture>>,
}

/// How a mesh is shaded.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Lit with the full Phong model when all maps are present.
    Material(MaterialMaps),
    /// Diffuse-only surface that an accelerated backend may alpha blend.
    Transparent {
        diffuse: Option<Arc<Texture>>,
        enabled: bool,
    },
}

impl Default for Effect {
    fn default() -> Self {
        Effect::Material(MaterialMaps::default())
    }
}

impl Effect {
    pub fn transparent(diffuse: Option<Arc<Texture>>) -> Self {
        Effect::Transparent {
            diffuse,
            enabled: true,
        }
    }

    pub fn diffuse(&self) -> Option<&Texture> {
        match self {
            Effect::Material(maps) => maps.diffuse.as_deref(),
            Effect::Transparent { diffuse, .. } => diffuse.as_deref(),
        }
    }

    pub fn normal(&self) -> Option<&Texture> {
        match self {
            Effect::Material(maps) => maps.normal.as_deref(),
            Effect::Transparent { .. } => None,
        }
    }

    pub fn specular(&self) -> Option<&Texture> {
        match self {
            Effect::Material(maps) => maps.specular.as_deref(),
            Effect::Transparent { .. } => None,
        }
    }

    pub fn glossiness(&self) -> Option<&Texture> {
        match self {
            Effect::Material(maps) => maps.glossiness.as_deref(),
            Effect::Transparent { .. } => None,
        }
    }

    /// `Some(enabled)` for transparent effects, `None` otherwise.
    pub fn transparency(&self) -> Option<bool> {
        match self {
            Effect::Material(_) => None,
            Effect::Transparent { enabled, .. } => Some(*enabled),
        }
    }

    /// Flips the transparency toggle. Returns the new state, or `None` if
    /// the effect cannot blend.
    pub fn toggle_transparency(&mut self) -> Option<bool> {
        match self {
            Effect::Material(_) => None,
            Effect::Transparent { enabled, .. } => {
                *enabled = !*enabled;
                Some(*enabled)
            }
        }
    }
}
