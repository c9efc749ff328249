//! Image → particle sampling.
//!
//! The image is first fitted onto a canvas, then walked at a configurable
//! stride either uniformly or in two edge-aware passes. Every accepted pixel
//! becomes one particle in a fixed-capacity arena; once the arena is full the
//! walk stops and the field is truncated to what was written.

use std::borrow::Cow;

use image::{RgbaImage, imageops::{self, FilterType}};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{
    algorithms::{
        depth::{DepthInput, apply_invert, raw_depth, stereo_offset},
        edges::EdgeMap,
        filter::{ColorFilter, CropRegion},
        tint::TintTable,
    },
    arena::{Particle, ParticleArena},
    error::{FieldError, Result},
    settings::SamplerSettings,
    traits::{ColorTransform, PixelFilter},
    types::ParticleField,
};

/// Pixels with lower alpha are never sampled.
pub const ALPHA_CUTOFF: u8 = 50;
/// Smallest arena ever allocated (still clamped by `max_particles`).
pub const MIN_CAPACITY: usize = 1_000;
/// Capacity inflation applied when edge-aware sampling is enabled.
pub const EDGE_CAPACITY_MULTIPLIER: usize = 3;
/// Size multiplier of fill-pass particles.
pub const FILL_SIZE_MULTIPLIER: f32 = 0.5;
/// Seed used by [`sample`] when no RNG is supplied.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Canvas dimensions an image is fitted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasFit {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

fn round_even(v: f32) -> u32 {
    (((v / 2.0).round() as u32) * 2).max(2)
}

/// Fit `width × height` so the longest side lies within `min..=max`,
/// preserving aspect ratio and rounding both sides to even values.
pub fn fit_canvas(width: u32, height: u32, min_size: u32, max_size: u32) -> CanvasFit {
    let longest = width.max(height) as f32;
    let scale = if longest > max_size as f32 {
        max_size as f32 / longest
    } else if longest < min_size as f32 {
        min_size as f32 / longest
    } else {
        1.0
    };

    CanvasFit {
        width: round_even(width as f32 * scale),
        height: round_even(height as f32 * scale),
        scale,
    }
}

/// Arena size for a canvas, before any pixel is visited.
pub fn estimate_capacity(width: u32, height: u32, settings: &SamplerSettings) -> usize {
    let stride = settings.stride();
    let mut estimate = (width.div_ceil(stride) as usize) * (height.div_ceil(stride) as usize);
    if settings.edge_sampling.enabled {
        estimate *= EDGE_CAPACITY_MULTIPLIER;
    }
    estimate.max(MIN_CAPACITY).min(settings.max_particles)
}

/// Per-run state shared by the sampling passes.
struct Walk<'a> {
    canvas: &'a RgbaImage,
    settings: &'a SamplerSettings,
    filters: [&'a dyn PixelFilter; 2],
    tint: &'a TintTable,
    arena: ParticleArena,
    center: (f32, f32),
    max_dist: f32,
}

impl<'a> Walk<'a> {
    /// Brightness of the pixel if it passes alpha, threshold, crop and color
    /// filtering.
    fn accepts(&self, x: u32, y: u32) -> Option<f32> {
        let rgba = self.canvas.get_pixel(x, y).0;
        if rgba[3] < ALPHA_CUTOFF {
            return None;
        }
        let brightness = (rgba[0] as f32 + rgba[1] as f32 + rgba[2] as f32) / 3.0;
        if brightness < self.settings.threshold {
            return None;
        }
        if !self.filters.iter().all(|f| f.keeps(x, y, rgba)) {
            return None;
        }
        Some(brightness)
    }

    /// Write one particle; `false` once the arena is full.
    fn emit(&mut self, x: u32, y: u32, brightness: f32, size_multiplier: f32) -> bool {
        if self.arena.is_full() {
            return false;
        }

        let rgba = self.canvas.get_pixel(x, y).0;
        let (cx, cy) = self.center;
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let depth_settings = &self.settings.depth;

        let input = DepthInput {
            image: self.canvas,
            x,
            y,
            rgb: [rgba[0], rgba[1], rgba[2]],
            brightness,
            dist: (dx * dx + dy * dy).sqrt(),
            max_dist: self.max_dist,
        };
        let raw = raw_depth(&input, depth_settings);
        let z = apply_invert(raw, depth_settings);

        let color = self.tint.transform([
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
        ]);

        let particle = Particle {
            position: [dx + stereo_offset(raw, depth_settings), -dy, z],
            color,
            size: brightness / 255.0 * size_multiplier,
        };

        self.arena.push(particle)
    }

    /// Walk the canvas at `stride`, offering pixels chosen by `select`.
    ///
    /// `select` returns the size multiplier for pixels it wants, or `None`.
    /// Returns how many particles were added and whether the arena filled up.
    fn pass(
        &mut self,
        stride: u32,
        mut select: impl FnMut(u32, u32) -> Option<f32>,
    ) -> (usize, bool) {
        let (width, height) = self.canvas.dimensions();
        let mut added = 0;

        for y in (0..height).step_by(stride as usize) {
            for x in (0..width).step_by(stride as usize) {
                let Some(multiplier) = select(x, y) else {
                    continue;
                };
                let Some(brightness) = self.accepts(x, y) else {
                    continue;
                };
                if !self.emit(x, y, brightness, multiplier) {
                    return (added, true);
                }
                added += 1;
            }
        }

        (added, false)
    }
}

/// Image sampler with resolved filters and color transforms
#[derive(Debug, Clone)]
pub struct ParticleSampler {
    settings: SamplerSettings,
    color_filter: ColorFilter,
    tint: TintTable,
}

impl ParticleSampler {
    /// Validate settings and resolve the color filter and tint table.
    pub fn new(settings: SamplerSettings) -> Result<Self> {
        settings.validate()?;
        let tint = TintTable::new(&settings.color_tint)?;
        Ok(Self {
            color_filter: ColorFilter::new(settings.color_filter.clone()),
            tint,
            settings,
        })
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    /// Sample an image into a new particle field.
    pub fn sample<R: Rng + ?Sized>(&self, image: &RgbaImage, rng: &mut R) -> Result<ParticleField> {
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            return Err(FieldError::EmptyImage { width: src_w, height: src_h });
        }

        let settings = &self.settings;
        let fit = fit_canvas(src_w, src_h, settings.min_canvas_size, settings.max_canvas_size);
        let canvas: Cow<'_, RgbaImage> = if (fit.width, fit.height) == (src_w, src_h) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(imageops::resize(image, fit.width, fit.height, FilterType::Triangle))
        };

        let edge_settings = settings.edge_sampling;
        let edges = edge_settings.enabled.then(|| EdgeMap::detect(&canvas));

        let capacity = estimate_capacity(fit.width, fit.height, settings);
        let crop = CropRegion::new(settings.crop, fit.width, fit.height);
        let center = (fit.width as f32 / 2.0, fit.height as f32 / 2.0);

        let mut walk = Walk {
            canvas: &*canvas,
            settings,
            filters: [&crop, &self.color_filter],
            tint: &self.tint,
            arena: ParticleArena::with_capacity(capacity),
            center,
            max_dist: (center.0 * center.0 + center.1 * center.1).sqrt(),
        };

        let stride = settings.stride();
        match &edges {
            None => {
                let (added, full) = walk.pass(stride, |_, _| Some(1.0));
                debug!(added, full, stride, "uniform pass");
            }
            Some(edges) => {
                let sensitivity = edge_settings.edge_sensitivity;
                let edge_stride =
                    ((stride as f32 / edge_settings.edge_density_boost).floor() as u32).max(1);
                let (added, full) = walk.pass(edge_stride, |x, y| {
                    let strength = edges.strength(x, y);
                    (strength >= sensitivity).then_some(1.0 + strength)
                });
                debug!(added, full, stride = edge_stride, "edge pass");

                let fill_density = edge_settings.fill_density;
                if !full && !edge_settings.pure_outline && fill_density > 0.0 {
                    let fill_stride = ((stride as f32 / fill_density).floor() as u32).max(1);
                    let (added, full) = walk.pass(fill_stride, |x, y| {
                        if edges.strength(x, y) >= sensitivity {
                            return None;
                        }
                        (rng.r#gen::<f32>() < fill_density).then_some(FILL_SIZE_MULTIPLIER)
                    });
                    debug!(added, full, stride = fill_stride, "fill pass");
                }
            }
        }

        let field = walk.arena.into_field(fit.width, fit.height, fit.scale);
        debug!(
            count = field.count,
            capacity,
            canvas_width = fit.width,
            canvas_height = fit.height,
            "sampled particle field"
        );
        Ok(field)
    }
}

/// Sample with a freshly validated sampler and the default seed.
pub fn sample(image: &RgbaImage, settings: &SamplerSettings) -> Result<ParticleField> {
    let mut rng = StdRng::seed_from_u64(DEFAULT_SEED);
    sample_with_rng(image, settings, &mut rng)
}

/// Sample with a caller-supplied random source.
pub fn sample_with_rng<R: Rng + ?Sized>(
    image: &RgbaImage,
    settings: &SamplerSettings,
    rng: &mut R,
) -> Result<ParticleField> {
    ParticleSampler::new(settings.clone())?.sample(image, rng)
}
