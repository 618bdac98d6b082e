pub mod camera;
pub mod context;
pub mod effect;
pub mod light;
pub mod loader;
pub mod mesh;
pub mod scene_graph;
pub mod texture;
