//! Line graph construction between particles.
//!
//! Every algorithm works on the same prepared candidate set: a shuffled,
//! size-filtered sample of particle indices. Algorithms only propose pairs;
//! the [`EdgeSink`] enforces the limits shared by all modes (line budget and
//! per-particle degree cap) and writes the line buffers.

pub mod color;
pub mod delaunay;
pub mod distance;
pub mod knn;

use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, warn};

use crate::{
    color::rgb_distance,
    error::Result,
    sampler::DEFAULT_SEED,
    settings::{DistanceRange, LineMode, LineSettings, SizeFilter},
    traits::LineAlgorithm,
    types::{LineGraph, ParticleField},
};

pub use color::ColorLines;
pub use delaunay::{DelaunayLines, Point2D, Triangle, triangulate};
pub use distance::DistanceLines;
pub use knn::KnnLines;

/// Largest subset of sizes sorted to estimate a percentile.
const PERCENTILE_SAMPLE_LIMIT: usize = 1_000;
/// Share of a distance range, next to its `max`, over which lines fade out.
const RANGE_FADE_SHARE: f32 = 0.15;

/// Hermite smoothstep on `t` clamped to `0..=1`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fade for a distance inside `range`: full brightness, easing to zero over
/// the last 15% of the span.
pub fn range_fade(distance: f32, range: &DistanceRange) -> f32 {
    let span = range.max - range.min;
    if span <= 0.0 {
        return 1.0;
    }
    let fade_start = range.max - RANGE_FADE_SHARE * span;
    if distance <= fade_start {
        1.0
    } else {
        1.0 - smoothstep((distance - fade_start) / (range.max - fade_start))
    }
}

/// Size floor implied by the filter, or `None` when no floor applies.
fn size_floor(field: &ParticleField, filter: &SizeFilter) -> Option<f32> {
    let mut floor: Option<f32> = filter.min_size;

    if let Some(relative) = filter.min_relative_size {
        let f = field.max_size() * relative;
        floor = Some(floor.map_or(f, |v| v.max(f)));
    }

    if let Some(percentile) = filter.min_percentile {
        let step = field.count.div_ceil(PERCENTILE_SAMPLE_LIMIT).max(1);
        let mut sizes: Vec<f32> = field.sizes.iter().step_by(step).copied().collect();
        if !sizes.is_empty() {
            sizes.sort_by(f32::total_cmp);
            let idx = ((percentile / 100.0) * (sizes.len() - 1) as f32).round() as usize;
            let f = sizes[idx.min(sizes.len() - 1)];
            floor = Some(floor.map_or(f, |v| v.max(f)));
        }
    }

    floor
}

/// The particles an algorithm may connect, plus the shared pair gates.
pub struct LineCandidates<'a> {
    pub field: &'a ParticleField,
    pub settings: &'a LineSettings,
    /// Sampled particle indices in randomized order
    pub indices: Vec<usize>,
}

impl<'a> LineCandidates<'a> {
    /// Sample every `1 / sample_ratio`-th particle, drop those failing the
    /// size filter and shuffle the rest.
    pub fn prepare<R: Rng + ?Sized>(
        field: &'a ParticleField,
        settings: &'a LineSettings,
        rng: &mut R,
    ) -> Self {
        let stride = ((1.0 / settings.sample_ratio).round() as usize).max(1);
        let floor = if settings.size_filter.is_active() {
            size_floor(field, &settings.size_filter)
        } else {
            None
        };

        let mut indices: Vec<usize> = (0..field.count)
            .step_by(stride)
            .filter(|&i| floor.is_none_or(|f| field.size(i) >= f))
            .collect();
        indices.shuffle(rng);

        Self { field, settings, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Distance with the Z delta scaled by `z_depth_weight`.
    pub fn weighted_distance(&self, a: usize, b: usize) -> f32 {
        let [ax, ay, az] = self.field.position(a);
        let [bx, by, bz] = self.field.position(b);
        let dx = ax - bx;
        let dy = ay - by;
        let dz = (az - bz) * self.settings.z_depth_weight;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Plain Euclidean distance.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        let [ax, ay, az] = self.field.position(a);
        let [bx, by, bz] = self.field.position(b);
        let (dx, dy, dz) = (ax - bx, ay - by, az - bz);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Whether the optional color-similarity gate lets the pair through.
    pub fn colors_similar(&self, a: usize, b: usize) -> bool {
        match self.settings.color_similarity {
            Some(tolerance) => rgb_distance(self.field.color(a), self.field.color(b)) <= tolerance,
            None => true,
        }
    }

    /// Position with Z scaled by `z_depth_weight`, for spatial indexing.
    pub fn weighted_position(&self, i: usize) -> [f32; 3] {
        let [x, y, z] = self.field.position(i);
        [x, y, z * self.settings.z_depth_weight]
    }
}

/// Collects accepted lines and enforces the line budget and degree cap.
pub struct EdgeSink<'a> {
    field: &'a ParticleField,
    graph: LineGraph,
    max_lines: usize,
    max_connections: Option<u32>,
    degrees: HashMap<usize, u32>,
}

impl<'a> EdgeSink<'a> {
    pub fn new(field: &'a ParticleField, settings: &LineSettings) -> Self {
        Self {
            field,
            graph: LineGraph::with_capacity(settings.max_lines.min(field.count * 4)),
            max_lines: settings.max_lines,
            max_connections: settings.max_connections,
            degrees: HashMap::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.graph.count >= self.max_lines
    }

    /// Whether particle `i` already has its maximum number of lines.
    pub fn at_capacity(&self, i: usize) -> bool {
        match self.max_connections {
            Some(cap) => self.degrees.get(&i).copied().unwrap_or(0) >= cap,
            None => false,
        }
    }

    /// Add a line from `a` to `b` unless the budget or either degree cap is
    /// exhausted.
    pub fn try_connect(&mut self, a: usize, b: usize, fade: f32) -> bool {
        if self.is_full() || self.at_capacity(a) || self.at_capacity(b) {
            return false;
        }
        self.graph.push(self.field, a, b, fade);
        if self.max_connections.is_some() {
            *self.degrees.entry(a).or_insert(0) += 1;
            *self.degrees.entry(b).or_insert(0) += 1;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.graph.count
    }

    pub fn is_empty(&self) -> bool {
        self.graph.count == 0
    }

    pub fn finish(self) -> LineGraph {
        self.graph
    }
}

/// Line builder with validated settings and the algorithm for its mode
pub struct LineBuilder {
    settings: LineSettings,
    algorithm: Box<dyn LineAlgorithm>,
}

impl LineBuilder {
    pub fn new(settings: LineSettings) -> Result<Self> {
        settings.validate()?;
        let algorithm: Box<dyn LineAlgorithm> = match settings.mode {
            LineMode::Distance => Box::new(DistanceLines),
            LineMode::Color { color_threshold, distance_multiplier } => Box::new(ColorLines {
                color_threshold,
                distance_multiplier,
            }),
            LineMode::Knn { k } => Box::new(KnnLines { k }),
            LineMode::Delaunay => Box::new(DelaunayLines::default()),
        };
        Ok(Self { settings, algorithm })
    }

    pub fn settings(&self) -> &LineSettings {
        &self.settings
    }

    /// Build the graph, or `None` when lines are disabled or there are fewer
    /// than two particles.
    pub fn build<R: Rng + ?Sized>(&self, field: &ParticleField, rng: &mut R) -> Option<LineGraph> {
        if !self.settings.enabled || field.count < 2 {
            return None;
        }

        let candidates = LineCandidates::prepare(field, &self.settings, rng);
        let mut sink = EdgeSink::new(field, &self.settings);
        if candidates.len() >= 2 && self.settings.max_lines > 0 {
            self.algorithm.connect(&candidates, &mut sink);
        }

        let graph = sink.finish();
        debug!(
            mode = %self.settings.mode,
            sampled = candidates.len(),
            lines = graph.count,
            "built line graph"
        );
        Some(graph)
    }
}

/// Build lines with the default seed.
///
/// Settings are checked with [`LineSettings::validate`] first; settings that
/// fail it are logged and yield `None`, so call `validate` yourself to see
/// the reason.
pub fn build_lines(field: &ParticleField, settings: &LineSettings) -> Option<LineGraph> {
    let mut rng = StdRng::seed_from_u64(DEFAULT_SEED);
    build_lines_with_rng(field, settings, &mut rng)
}

/// Build lines with a caller-supplied random source.
///
/// Like [`build_lines`], settings failing [`LineSettings::validate`] are
/// logged and produce no graph.
pub fn build_lines_with_rng<R: Rng + ?Sized>(
    field: &ParticleField,
    settings: &LineSettings,
    rng: &mut R,
) -> Option<LineGraph> {
    match LineBuilder::new(settings.clone()) {
        Ok(builder) => builder.build(field, rng),
        Err(e) => {
            warn!("line settings rejected: {e}");
            None
        }
    }
}
