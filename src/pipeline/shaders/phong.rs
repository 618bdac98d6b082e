use crate::core::geometry::VertexOut;
use crate::core::pipeline::PixelShader;
use crate::scene::effect::Effect;
use crate::scene::light::DirectionalLight;
use crate::scene::texture::TextureFilter;
use nalgebra::{Matrix3, Vector3};

/// Exponent applied to the glossiness map's red channel.
pub const SHININESS: f32 = 25.0;

/// Lambert diffuse plus map-driven Phong specular, with optional tangent
/// space normal mapping.
///
/// The set of bound maps decides the model: without a normal map the
/// interpolated normal is used, and without both a specular and a
/// glossiness map the result is diffuse only. Transparent effects never
/// expose those maps, so they always shade diffuse only.
pub struct PhongShader<'a> {
    pub light: &'a DirectionalLight,
    pub effect: &'a Effect,
    pub filter: TextureFilter,
}

impl<'a> PhongShader<'a> {
    pub fn new(light: &'a DirectionalLight, effect: &'a Effect, filter: TextureFilter) -> Self {
        Self {
            light,
            effect,
            filter,
        }
    }

    fn shading_normal(&self, fragment: &VertexOut) -> Vector3<f32> {
        let Some(normal_map) = self.effect.normal() else {
            return fragment.normal;
        };

        let bitangent = fragment.tangent.cross(&fragment.normal);
        let tangent_space = Matrix3::from_columns(&[fragment.tangent, bitangent, fragment.normal]);

        let sample = normal_map.sample(&fragment.uv, self.filter);
        let tangent_normal = sample * 2.0 - Vector3::new(1.0, 1.0, 1.0);
        tangent_space * tangent_normal
    }
}

impl PixelShader for PhongShader<'_> {
    fn shade(&self, fragment: &VertexOut, view_direction: &Vector3<f32>) -> Vector3<f32> {
        let normal = self.shading_normal(fragment);
        let light_dir = self.light.direction;

        let lambert = (-normal).dot(&light_dir);
        if lambert <= 0.0 {
            return Vector3::zeros();
        }

        let albedo = match self.effect.diffuse() {
            Some(map) => map.sample(&fragment.uv, self.filter),
            None => fragment.color,
        };
        let diffuse = self.light.radiance().component_mul(&albedo) * lambert;

        let (Some(specular_map), Some(gloss_map)) = (self.effect.specular(), self.effect.glossiness())
        else {
            return diffuse;
        };

        let specular = specular_map.sample(&fragment.uv, self.filter);
        let gloss = gloss_map.sample(&fragment.uv, self.filter).x;

        let reflect = (light_dir - normal * (2.0 * normal.dot(&light_dir)))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let cos_alpha = reflect.dot(&-view_direction).clamp(0.0, 1.0);

        diffuse + specular * cos_alpha.powf(gloss * SHININESS)
    }
}
