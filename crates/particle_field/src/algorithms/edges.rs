//! Sobel edge strength with a 3×3 box blur.

use image::{ImageBuffer, Luma, RgbaImage, imageops};

use crate::color::luminance;

/// Gradient magnitudes are divided by this before clamping to `0..=1`.
pub const SOBEL_NORMALIZATION: f32 = 500.0;

/// Normalized Sobel magnitude at `(x, y)` given a luminance lookup.
///
/// Border pixels have no full neighbourhood and report `0.0`.
fn sobel_at(width: u32, height: u32, x: u32, y: u32, luma: impl Fn(u32, u32) -> f32) -> f32 {
    if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
        return 0.0;
    }

    let tl = luma(x - 1, y - 1);
    let t = luma(x, y - 1);
    let tr = luma(x + 1, y - 1);
    let l = luma(x - 1, y);
    let r = luma(x + 1, y);
    let bl = luma(x - 1, y + 1);
    let b = luma(x, y + 1);
    let br = luma(x + 1, y + 1);

    let gx = (tr + 2.0 * r + br) - (tl + 2.0 * l + bl);
    let gy = (bl + 2.0 * b + br) - (tl + 2.0 * t + tr);

    ((gx * gx + gy * gy).sqrt() / SOBEL_NORMALIZATION).clamp(0.0, 1.0)
}

/// Normalized Sobel magnitude of a single pixel, read straight from the raster.
pub fn sobel_magnitude(image: &RgbaImage, x: u32, y: u32) -> f32 {
    sobel_at(image.width(), image.height(), x, y, |px, py| {
        let p = image.get_pixel(px, py).0;
        luminance(p[0], p[1], p[2])
    })
}

/// Dense per-pixel edge strength in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl EdgeMap {
    /// Run Sobel over every interior pixel, then box-blur the magnitudes to
    /// suppress isolated spikes.
    pub fn detect(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let luma: Vec<f32> = image
            .pixels()
            .map(|p| luminance(p[0], p[1], p[2]))
            .collect();

        let gradient: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(width, height, |x, y| {
                Luma([sobel_at(width, height, x, y, |px, py| luma[(py * width + px) as usize])])
            });

        let blurred = imageops::filter3x3(&gradient, &[1.0; 9]);

        Self {
            width,
            height,
            data: blurred.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Edge strength at `(x, y)`; out-of-bounds reads return `0.0`.
    pub fn strength(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[(y * self.width + x) as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
