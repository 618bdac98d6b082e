use std::path::PathBuf;

/// Errors raised outside the rasterization core: loading scenes, meshes and
/// textures, writing images and opening the window.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load OBJ '{path}': {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("render size {width}x{height} must be non-zero")]
    InvalidDimensions { width: usize, height: usize },

    #[error("index buffer length {0} is not a multiple of 3")]
    IndexCount(usize),

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
