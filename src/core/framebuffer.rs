use crate::core::color::to_argb;
use nalgebra::Vector3;

/// Color and depth targets for the software path.
///
/// The color buffer holds one packed 0xAARRGGBB value per pixel so it can be
/// handed to the window as-is. The depth buffer holds the raw depth written by
/// the rasterizer; both are reset once per frame.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            color_buffer: vec![0; size],
            depth_buffer: vec![f32::INFINITY; size],
        }
    }

    /// Fills the color buffer with `color` and resets every depth to +inf.
    pub fn clear(&mut self, color: Vector3<f32>) {
        self.color_buffer.fill(to_argb(color));
        self.depth_buffer.fill(f32::INFINITY);
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Depth test and update.
    ///
    /// Compares magnitudes: the new fragment wins only if `|depth|` is
    /// strictly smaller than the stored magnitude, so equal depths keep the
    /// fragment that was submitted first.
    #[inline]
    pub fn depth_test_and_update(&mut self, x: usize, y: usize, depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        if depth.abs() >= self.depth_buffer[idx].abs() {
            return false;
        }
        self.depth_buffer[idx] = depth;
        true
    }

    /// Writes a [0, 1] color. Should only be called after a passing depth test.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Vector3<f32>) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.color_buffer[idx] = to_argb(color);
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u32> {
        self.in_bounds(x, y)
            .then(|| self.color_buffer[self.index(x, y)])
    }

    pub fn get_depth(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y)
            .then(|| self.depth_buffer[self.index(x, y)])
    }

    pub fn color_buffer(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth_buffer
    }
}
