use nalgebra::Vector3;

/// Scales the color down uniformly when its largest channel exceeds 1.0.
/// Keeps the hue instead of clipping each channel independently.
pub fn max_to_one(color: Vector3<f32>) -> Vector3<f32> {
    let max = color.x.max(color.y).max(color.z);
    if max > 1.0 { color / max } else { color }
}

/// Packs a [0, 1] RGB color into an opaque 0xAARRGGBB pixel.
#[inline]
pub fn to_argb(color: Vector3<f32>) -> u32 {
    let r = (color.x.clamp(0.0, 1.0) * 255.0) as u32;
    let g = (color.y.clamp(0.0, 1.0) * 255.0) as u32;
    let b = (color.z.clamp(0.0, 1.0) * 255.0) as u32;
    (255 << 24) | (r << 16) | (g << 8) | b
}

/// Splits a packed 0xAARRGGBB pixel into its RGB bytes.
#[inline]
pub fn unpack_rgb(pixel: u32) -> [u8; 3] {
    [
        ((pixel >> 16) & 0xFF) as u8,
        ((pixel >> 8) & 0xFF) as u8,
        (pixel & 0xFF) as u8,
    ]
}
