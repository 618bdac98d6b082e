pub mod phong;

pub use phong::PhongShader;
