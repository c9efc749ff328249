use serde::{Deserialize, Serialize};

/// A sampled point cloud stored as a structure of flat arrays.
///
/// `positions` and `colors` hold three floats per particle, `sizes` one, so
/// the buffers can be handed to a renderer as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleField {
    pub count: usize,
    /// `[x, y, z]` per particle, X/Y centered on the canvas with Y up
    pub positions: Vec<f32>,
    /// `[r, g, b]` per particle, each in `0.0..=1.0`
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
    /// Canvas dimensions the image was fitted to before sampling
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Uniform factor from source image pixels to canvas pixels
    pub scale: f32,
}

impl ParticleField {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn position(&self, i: usize) -> [f32; 3] {
        [self.positions[i * 3], self.positions[i * 3 + 1], self.positions[i * 3 + 2]]
    }

    pub fn color(&self, i: usize) -> [f32; 3] {
        [self.colors[i * 3], self.colors[i * 3 + 1], self.colors[i * 3 + 2]]
    }

    pub fn size(&self, i: usize) -> f32 {
        self.sizes[i]
    }

    /// Largest particle size, `0.0` for an empty field.
    pub fn max_size(&self) -> f32 {
        self.sizes.iter().copied().fold(0.0, f32::max)
    }

    /// Build a field directly from per-particle records.
    pub fn from_particles(particles: &[([f32; 3], [f32; 3], f32)]) -> Self {
        let mut field = Self {
            count: particles.len(),
            positions: Vec::with_capacity(particles.len() * 3),
            colors: Vec::with_capacity(particles.len() * 3),
            sizes: Vec::with_capacity(particles.len()),
            canvas_width: 0,
            canvas_height: 0,
            scale: 1.0,
        };
        for &(position, color, size) in particles {
            field.positions.extend_from_slice(&position);
            field.colors.extend_from_slice(&color);
            field.sizes.push(size);
        }
        field
    }
}

/// Line segments between particles.
///
/// Each line contributes two position triples and two color triples (one per
/// endpoint). `pairs` records which particles each line connects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineGraph {
    pub count: usize,
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub pairs: Vec<[usize; 2]>,
}

impl LineGraph {
    pub fn with_capacity(lines: usize) -> Self {
        Self {
            count: 0,
            positions: Vec::with_capacity(lines * 6),
            colors: Vec::with_capacity(lines * 6),
            pairs: Vec::with_capacity(lines),
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append a segment from particle `a` to particle `b` with endpoint
    /// colors scaled by `fade`.
    pub fn push(&mut self, field: &ParticleField, a: usize, b: usize, fade: f32) {
        for i in [a, b] {
            self.positions.extend_from_slice(&field.position(i));
            self.colors.extend(field.color(i).map(|c| c * fade));
        }
        self.pairs.push([a, b]);
        self.count += 1;
    }

    /// Whether the unordered pair `{a, b}` appears in the graph.
    pub fn connects(&self, a: usize, b: usize) -> bool {
        self.pairs.iter().any(|&[p, q]| (p == a && q == b) || (p == b && q == a))
    }
}

/// Result of running the full pipeline on one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOutput {
    pub particles: ParticleField,
    /// `None` when lines are disabled or there are fewer than two particles
    pub lines: Option<LineGraph>,
    /// Original image dimensions
    pub image_width: u32,
    pub image_height: u32,
}
