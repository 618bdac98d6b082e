use crate::error::Result;
use image::RgbImage;
use log::info;
use nalgebra::{Vector2, Vector3};
use std::path::Path;
use std::sync::Arc;

/// How texels are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Bilinear,
}

/// An RGB texture map, sampled with uv in `[0, 1]`.
///
/// Row 0 is the top of the image and corresponds to `v = 0`; the OBJ loader
/// already flips v.
#[derive(Debug, Clone)]
pub struct Texture {
    image: Arc<RgbImage>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let image = image::open(path_ref)?.to_rgb8();
        let texture = Self::from_image(image);

        info!(
            "Loaded texture: {:?} ({}x{})",
            path_ref, texture.width, texture.height
        );
        Ok(texture)
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            image: Arc::new(image),
        }
    }

    /// Samples the texture. Returns black when u or v leaves `[0, 1]`.
    pub fn sample(&self, uv: &Vector2<f32>, filter: TextureFilter) -> Vector3<f32> {
        if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
            return Vector3::zeros();
        }
        if self.width == 0 || self.height == 0 {
            return Vector3::zeros();
        }

        match filter {
            TextureFilter::Nearest => self.sample_nearest(uv),
            TextureFilter::Bilinear => self.sample_bilinear(uv),
        }
    }

    fn sample_nearest(&self, uv: &Vector2<f32>) -> Vector3<f32> {
        // u == 1 would index one past the last texel.
        let x = ((uv.x * self.width as f32) as u32).min(self.width - 1);
        let y = ((uv.y * self.height as f32) as u32).min(self.height - 1);
        self.texel(x as i32, y as i32)
    }

    fn sample_bilinear(&self, uv: &Vector2<f32>) -> Vector3<f32> {
        // -0.5 because texel centers are at 0.5
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;

        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let wx = x - x.floor();
        let wy = y - y.floor();

        let c00 = self.texel(x0, y0);
        let c10 = self.texel(x0 + 1, y0);
        let c01 = self.texel(x0, y0 + 1);
        let c11 = self.texel(x0 + 1, y0 + 1);

        let top = c00 * (1.0 - wx) + c10 * wx;
        let bottom = c01 * (1.0 - wx) + c11 * wx;
        top * (1.0 - wy) + bottom * wy
    }

    /// Texel fetch with edge clamping, as raw `[0, 1]` values.
    fn texel(&self, x: i32, y: i32) -> Vector3<f32> {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        let y = y.clamp(0, self.height as i32 - 1) as u32;
        let pixel = self.image.get_pixel(x, y);

        Vector3::new(
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checker() -> Texture {
        // 2x2: red, green / blue, white
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(1, 0, Rgb([0, 255, 0]));
        image.put_pixel(0, 1, Rgb([0, 0, 255]));
        image.put_pixel(1, 1, Rgb([255, 255, 255]));
        Texture::from_image(image)
    }

    #[test]
    fn nearest_picks_texel_by_uv() {
        let tex = checker();
        let f = TextureFilter::Nearest;
        assert_eq!(tex.sample(&Vector2::new(0.1, 0.1), f), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(tex.sample(&Vector2::new(0.9, 0.1), f), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(tex.sample(&Vector2::new(0.1, 0.9), f), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn nearest_clamps_at_upper_edge() {
        let tex = checker();
        let c = tex.sample(&Vector2::new(1.0, 1.0), TextureFilter::Nearest);
        assert_eq!(c, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn out_of_range_uv_is_black() {
        let tex = checker();
        for uv in [
            Vector2::new(-0.01, 0.5),
            Vector2::new(0.5, 1.01),
            Vector2::new(2.0, 2.0),
        ] {
            assert_eq!(tex.sample(&uv, TextureFilter::Nearest), Vector3::zeros());
            assert_eq!(tex.sample(&uv, TextureFilter::Bilinear), Vector3::zeros());
        }
    }

    #[test]
    fn bilinear_blends_neighbours() {
        let tex = checker();
        // Exactly between the two top texels.
        let c = tex.sample(&Vector2::new(0.5, 0.25), TextureFilter::Bilinear);
        assert!((c - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-5);

        // At a texel center bilinear equals nearest.
        let center = Vector2::new(0.25, 0.75);
        assert!(
            (tex.sample(&center, TextureFilter::Bilinear)
                - tex.sample(&center, TextureFilter::Nearest))
            .norm()
                < 1e-5
        );
    }

    #[test]
    fn load_reads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tex.png");
        let mut image = RgbImage::new(3, 1);
        image.put_pixel(2, 0, Rgb([10, 20, 30]));
        image.save(&path).unwrap();

        let tex = Texture::load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (3, 1));
        let c = tex.sample(&Vector2::new(0.99, 0.5), TextureFilter::Nearest);
        assert!((c - Vector3::new(10.0, 20.0, 30.0) / 255.0).norm() < 1e-6);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Texture::load("does/not/exist.png").is_err());
    }
}
