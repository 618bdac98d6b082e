use crate::core::color::unpack_rgb;
use crate::error::Result;
use chrono::Local;
use image::error::{ParameterError, ParameterErrorKind};
use image::{ImageError, RgbImage};
use log::info;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Converts a packed 0xAARRGGBB buffer into an RGB image, one row per task.
pub fn buffer_to_image(buffer: &[u32], width: usize, height: usize) -> Result<RgbImage> {
    let mut bytes = vec![0u8; width * height * 3];

    if width > 0 && buffer.len() >= width * height {
        bytes
            .par_chunks_mut(width * 3)
            .zip(buffer.par_chunks(width))
            .for_each(|(row, pixels)| {
                for (rgb, &pixel) in row.chunks_exact_mut(3).zip(pixels) {
                    rgb.copy_from_slice(&unpack_rgb(pixel));
                }
            });
    }

    RgbImage::from_raw(width as u32, height as u32, bytes)
        .filter(|_| buffer.len() >= width * height)
        .ok_or_else(|| {
            ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            ))
            .into()
        })
}

/// Saves a packed 0xAARRGGBB buffer to an image file (format from the
/// extension).
pub fn save_buffer_to_image<P: AsRef<Path>>(
    buffer: &[u32],
    width: usize,
    height: usize,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    buffer_to_image(buffer, width, height)?.save(path)?;
    info!("Saved {}x{} image to {:?}", width, height, path);
    Ok(())
}

/// `screenshot_YYYYmmdd_HHMMSS.png` in the current directory.
pub fn screenshot_path() -> PathBuf {
    PathBuf::from(format!(
        "screenshot_{}.png",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn conversion_unpacks_channels_in_row_order() {
        let buffer = [0xFFFF0000, 0xFF00FF00, 0xFF0000FF, 0xFF102030];
        let image = buffer_to_image(&buffer, 2, 2).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(image.get_pixel(0, 1).0, [0, 0, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [0x10, 0x20, 0x30]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = buffer_to_image(&[0; 3], 2, 2).unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }

    #[test]
    fn save_writes_a_readable_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        save_buffer_to_image(&[0xFF336699; 6], 3, 2, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [0x33, 0x66, 0x99]);
    }

    #[test]
    fn screenshot_names_are_png() {
        let path = screenshot_path();
        let name = path.to_string_lossy();
        assert!(name.starts_with("screenshot_"));
        assert!(name.ends_with(".png"));
    }
}
