pub mod builder;

use std::path::Path;

use image::RgbaImage;
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

use crate::{
    error::Result,
    io::load_rgba,
    lines::LineBuilder,
    sampler::ParticleSampler,
    settings::FieldSettings,
    types::FieldOutput,
};

/// Sampler and line builder run back to back on one seeded random stream
pub struct Pipeline {
    sampler: ParticleSampler,
    lines: LineBuilder,
    seed: u64,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a pipeline from complete settings, validating them first
    pub fn new(settings: FieldSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            sampler: ParticleSampler::new(settings.sampler)?,
            lines: LineBuilder::new(settings.lines)?,
            seed: settings.seed,
        })
    }

    /// Sample an image and build its line graph
    pub fn process(&self, image: &RgbaImage) -> Result<FieldOutput> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let particles = self.sampler.sample(image, &mut rng)?;
        let lines = self.lines.build(&particles, &mut rng);

        info!(
            particles = particles.count,
            lines = lines.as_ref().map_or(0, |l| l.count),
            canvas_width = particles.canvas_width,
            canvas_height = particles.canvas_height,
            "processed image"
        );

        Ok(FieldOutput {
            particles,
            lines,
            image_width: image.width(),
            image_height: image.height(),
        })
    }

    /// Load an image file and process it
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<FieldOutput> {
        let image = load_rgba(path)?;
        self.process(&image)
    }

    /// Settings the pipeline was built from
    pub fn settings(&self) -> FieldSettings {
        FieldSettings {
            sampler: self.sampler.settings().clone(),
            lines: self.lines.settings().clone(),
            seed: self.seed,
        }
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        let sampler = self.sampler.settings();
        let lines = self.lines.settings();
        format!(
            "Pipeline: depth {}, density {}, edge sampling {}, lines {}",
            sampler.depth.mode,
            sampler.density,
            if sampler.edge_sampling.enabled { "on" } else { "off" },
            if lines.enabled { lines.mode.to_string() } else { "off".to_string() },
        )
    }
}
