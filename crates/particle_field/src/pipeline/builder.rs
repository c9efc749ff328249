use crate::{
    error::Result,
    pipeline::Pipeline,
    settings::{
        ColorFilterSettings, ColorTintSettings, CropMode, DepthMode, DistanceRange,
        EdgeSamplingSettings, FieldSettings, LineMode, LineSettings, SamplerSettings,
    },
};

/// Builder for creating pipelines with a fluent API
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    settings: FieldSettings,
}

impl PipelineBuilder {
    /// Create a new pipeline builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a complete settings document
    pub fn from_settings(settings: FieldSettings) -> Self {
        Self { settings }
    }

    /// Replace all sampler settings
    pub fn sampler(mut self, sampler: SamplerSettings) -> Self {
        self.settings.sampler = sampler;
        self
    }

    /// Sampling stride in canvas pixels
    pub fn density(mut self, density: f32) -> Self {
        self.settings.sampler.density = density;
        self
    }

    /// Minimum pixel brightness (0-255)
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.settings.sampler.threshold = threshold;
        self
    }

    pub fn max_particles(mut self, max_particles: usize) -> Self {
        self.settings.sampler.max_particles = max_particles;
        self
    }

    pub fn depth_mode(mut self, mode: DepthMode) -> Self {
        self.settings.sampler.depth.mode = mode;
        self
    }

    pub fn depth_range(mut self, range: f32) -> Self {
        self.settings.sampler.depth.depth_range = range;
        self
    }

    pub fn invert_depth(mut self, invert: bool) -> Self {
        self.settings.sampler.depth.invert = invert;
        self
    }

    /// Toggle edge-aware sampling, keeping the other edge settings
    pub fn edge_sampling(mut self, enabled: bool) -> Self {
        self.settings.sampler.edge_sampling.enabled = enabled;
        self
    }

    pub fn edge_settings(mut self, edges: EdgeSamplingSettings) -> Self {
        self.settings.sampler.edge_sampling = edges;
        self
    }

    pub fn crop(mut self, crop: CropMode) -> Self {
        self.settings.sampler.crop = crop;
        self
    }

    pub fn color_filter(mut self, filter: ColorFilterSettings) -> Self {
        self.settings.sampler.color_filter = filter;
        self
    }

    pub fn color_tint(mut self, tint: ColorTintSettings) -> Self {
        self.settings.sampler.color_tint = tint;
        self
    }

    /// Replace all line settings
    pub fn lines(mut self, lines: LineSettings) -> Self {
        self.settings.lines = lines;
        self
    }

    /// Enable lines with the given algorithm
    pub fn line_mode(mut self, mode: LineMode) -> Self {
        self.settings.lines.enabled = true;
        self.settings.lines.mode = mode;
        self
    }

    /// Replace the distance ranges used by the line algorithms
    pub fn distance_ranges(mut self, ranges: Vec<DistanceRange>) -> Self {
        self.settings.lines.distance_ranges = ranges;
        self
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.settings.lines.max_lines = max_lines;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = seed;
        self
    }

    /// Validate the collected settings and build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        Pipeline::new(self.settings)
    }

    /// Build an outline-only pipeline: edge particles, no interior fill
    pub fn build_outline(density: f32) -> Result<Pipeline> {
        Self::new()
            .density(density)
            .edge_settings(EdgeSamplingSettings {
                enabled: true,
                pure_outline: true,
                ..Default::default()
            })
            .build()
    }

    /// Build a pipeline that links particles closer than `max_distance`
    pub fn build_constellation(density: f32, max_distance: f32) -> Result<Pipeline> {
        Self::new()
            .density(density)
            .line_mode(LineMode::Distance)
            .distance_ranges(vec![DistanceRange::new(0.0, max_distance)])
            .build()
    }
}
