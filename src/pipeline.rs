pub mod backend;
pub mod renderer;
pub mod shaders;
