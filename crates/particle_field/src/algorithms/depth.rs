//! Pixel → depth (Z) mapping.

use image::RgbaImage;

use crate::{
    algorithms::edges::sobel_magnitude,
    color::rgb8_to_hsl,
    noise::{fbm, value_noise},
    settings::{DepthMode, DepthSettings},
};

const LAYER_LEVELS: [f32; 4] = [0.0, 0.33, 0.66, 1.0];

/// Everything the depth mapper may look at for one canvas pixel.
#[derive(Debug, Clone, Copy)]
pub struct DepthInput<'a> {
    /// Canvas raster, used by the emboss mode
    pub image: &'a RgbaImage,
    pub x: u32,
    pub y: u32,
    pub rgb: [u8; 3],
    /// Channel-mean brightness, `0.0..=255.0`
    pub brightness: f32,
    /// Distance from the canvas center
    pub dist: f32,
    /// Distance from the canvas center to a corner
    pub max_dist: f32,
}

/// Depth before `invert` is applied.
pub fn raw_depth(input: &DepthInput<'_>, settings: &DepthSettings) -> f32 {
    let range = settings.depth_range;
    let nb = input.brightness / 255.0;
    let (x, y) = (input.x as f32, input.y as f32);

    match settings.mode {
        DepthMode::Brightness | DepthMode::Stereo { .. } => nb * range,
        DepthMode::InverseBrightness => (1.0 - nb) * range,
        DepthMode::Hue => {
            let [r, g, b] = input.rgb;
            rgb8_to_hsl(r, g, b).h / 360.0 * range
        }
        DepthMode::Saturation => {
            let [r, g, b] = input.rgb;
            rgb8_to_hsl(r, g, b).s * range
        }
        DepthMode::Perlin { noise_strength } => {
            nb * range / 2.0 + value_noise(x * 0.01, y * 0.01) * noise_strength
        }
        DepthMode::Radial => {
            if input.max_dist > 0.0 {
                (1.0 - input.dist / input.max_dist) * range
            } else {
                range
            }
        }
        DepthMode::Layered => {
            let level = ((nb * 4.0).floor() as usize).min(LAYER_LEVELS.len() - 1);
            LAYER_LEVELS[level] * range
        }
        DepthMode::Emboss => sobel_magnitude(input.image, input.x, input.y) * range,
        DepthMode::Fbm { octaves, noise_strength } => {
            let noise = fbm(x * 0.008, y * 0.008, octaves);
            nb * range * 0.3 + noise * range * 0.7 * (noise_strength / 40.0)
        }
        DepthMode::Wave { frequency, amplitude } => {
            0.5 * (1.0 + (input.dist * frequency).sin()) * range * amplitude
        }
    }
}

/// Final depth for a pixel under the configured mode.
pub fn depth(input: &DepthInput<'_>, settings: &DepthSettings) -> f32 {
    apply_invert(raw_depth(input, settings), settings)
}

#[inline]
pub fn apply_invert(z: f32, settings: &DepthSettings) -> f32 {
    if settings.invert { -z } else { z }
}

/// Horizontal parallax shift for stereo mode, computed from the raw depth.
///
/// Every other mode returns `0.0`.
pub fn stereo_offset(raw_z: f32, settings: &DepthSettings) -> f32 {
    match settings.mode {
        DepthMode::Stereo { separation } if settings.depth_range != 0.0 => {
            raw_z / settings.depth_range * separation
        }
        _ => 0.0,
    }
}
