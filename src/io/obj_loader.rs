use crate::core::geometry::Vertex;
use crate::error::{Error, Result};
use crate::scene::mesh::MeshBuilder;
use log::{info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use std::path::Path;

/// Loads an OBJ file into a [`MeshBuilder`], merging every model in the file.
///
/// Faces are triangulated; positions, uvs and normals keep their own index
/// streams and are combined per corner. The v coordinate is flipped so that
/// `v = 0` addresses the top row of a texture.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshBuilder> {
    let path = path.as_ref();
    info!("Loading OBJ file: {:?}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ..Default::default()
    };

    // Materials are configured per mesh in the scene file, MTL files are ignored.
    let (models, _materials) =
        tobj::load_obj(path, &load_options).map_err(|source| Error::Obj {
            path: path.to_path_buf(),
            source,
        })?;

    let mut builder = MeshBuilder::new();
    let mut triangle_count = 0;

    for model in &models {
        let mesh = &model.mesh;
        let has_normals = !mesh.normals.is_empty() && mesh.normal_indices.len() == mesh.indices.len();
        let has_texcoords =
            !mesh.texcoords.is_empty() && mesh.texcoord_indices.len() == mesh.indices.len();
        let has_colors = mesh.vertex_color.len() == mesh.positions.len();

        if !has_normals {
            warn!("Model '{}' has no normals, using face normals", model.name);
        }
        if !has_texcoords {
            warn!("Model '{}' has no texture coordinates", model.name);
        }

        for (face, corners) in mesh.indices.chunks_exact(3).enumerate() {
            let positions: [Point3<f32>; 3] =
                std::array::from_fn(|k| position(&mesh.positions, corners[k]));
            let face_normal = (positions[1] - positions[0])
                .cross(&(positions[2] - positions[0]))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::y);

            let vertices: [Vertex; 3] = std::array::from_fn(|k| {
                let corner = face * 3 + k;

                let normal = if has_normals {
                    vec3(&mesh.normals, mesh.normal_indices[corner])
                } else {
                    face_normal
                };

                let texcoord = if has_texcoords {
                    let t = mesh.texcoord_indices[corner] as usize;
                    mesh.texcoords
                        .get(t * 2..t * 2 + 2)
                        .map_or_else(Vector2::zeros, |uv| Vector2::new(uv[0], 1.0 - uv[1]))
                } else {
                    Vector2::zeros()
                };

                let vertex = Vertex::new(positions[k], texcoord, normal);
                if has_colors {
                    vertex.with_color(vec3(&mesh.vertex_color, corners[k]))
                } else {
                    vertex
                }
            });

            builder.push_triangle(vertices);
            triangle_count += 1;
        }
    }

    info!(
        "OBJ loaded: {} models, {} triangles, {} unique vertices",
        models.len(),
        triangle_count,
        builder.vertex_count()
    );

    Ok(builder)
}

fn position(data: &[f32], index: u32) -> Point3<f32> {
    Point3::from(vec3(data, index))
}

/// Reads the `index`-th xyz triple, zero when out of bounds.
fn vec3(data: &[f32], index: u32) -> Vector3<f32> {
    let i = index as usize * 3;
    data.get(i..i + 3)
        .map_or_else(Vector3::zeros, |v| Vector3::new(v[0], v[1], v[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn obj_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_triangulated_and_deduplicated() {
        let file = obj_file(QUAD);
        let (vertices, indices) = load_obj(file.path()).unwrap().finish();

        assert_eq!(indices.len(), 6);
        assert_eq!(vertices.len(), 4);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn v_is_flipped_and_tangent_follows_u() {
        let file = obj_file(QUAD);
        let (vertices, _) = load_obj(file.path()).unwrap().finish();

        let origin = vertices
            .iter()
            .find(|v| v.position == Point3::origin())
            .unwrap();
        assert_eq!(origin.texcoord, Vector2::new(0.0, 1.0));
        assert_eq!(origin.normal, Vector3::z());
        assert!((origin.color - Vector3::new(1.0, 1.0, 1.0)).norm() < 1e-6);

        // Flipped v grows downwards while y grows upwards; the tangent still
        // points along +u, which is +x.
        for v in &vertices {
            assert!((v.tangent - Vector3::x()).norm() < 1e-5, "{:?}", v.tangent);
        }
    }

    #[test]
    fn missing_normals_fall_back_to_face_normal() {
        let file = obj_file("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let (vertices, indices) = load_obj(file.path()).unwrap().finish();

        assert_eq!(indices, vec![0, 1, 2]);
        for v in &vertices {
            assert!((v.normal - Vector3::z()).norm() < 1e-6);
            assert_eq!(v.texcoord, Vector2::zeros());
            assert_eq!(v.tangent, Vector3::zeros());
        }
    }

    #[test]
    fn missing_file_is_an_obj_error() {
        let err = load_obj("does/not/exist.obj").unwrap_err();
        assert!(matches!(err, Error::Obj { .. }));
    }
}
