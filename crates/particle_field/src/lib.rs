//! # Particle Field Library
//!
//! Turns a raster image into a 3D point cloud and connects the points with a
//! sparse line graph.
//!
//! ## Core Features
//!
//! - **Edge-aware sampling**: Sobel edge map drives dense outline particles and a
//!   thinned interior fill
//! - **Depth modes**: Eleven ways to derive Z from brightness, color, noise, distance or edges
//! - **Color pipeline**: Hue interval filtering, k-means dominant colors and hue remapping
//! - **Line graphs**: Distance ranges, color similarity, k-nearest neighbours and Delaunay edges
//! - **Deterministic**: Every random choice comes from a seeded, injectable generator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use particle_field::Pipeline;
//!
//! // Create a pipeline with default settings
//! let pipeline = Pipeline::builder()
//!     .build()?;
//!
//! // Process an image
//! let image = image::open("photo.png")?.to_rgba8();
//! let output = pipeline.process(&image)?;
//!
//! // Export to JSON
//! output.save_json("field.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use particle_field::{Pipeline, DepthMode, LineMode};
//!
//! let pipeline = Pipeline::builder()
//!     .density(3.0)
//!     .edge_sampling(true)
//!     .depth_mode(DepthMode::Fbm { octaves: 4, noise_strength: 40.0 })
//!     .line_mode(LineMode::Knn { k: 3 })
//!     .seed(7)
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod settings;
pub mod traits;
pub mod color;
pub mod noise;
pub mod algorithms;
pub mod arena;
pub mod sampler;
pub mod spatial;
pub mod lines;
pub mod pipeline;
pub mod io;

// Re-exports for convenience
pub use error::{FieldError, Result};
pub use types::{FieldOutput, LineGraph, ParticleField};
pub use settings::*;
pub use traits::*;
pub use algorithms::extract_dominant_colors;
pub use sampler::{ParticleSampler, sample, sample_with_rng};
pub use lines::{LineBuilder, build_lines, build_lines_with_rng};
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use io::{load_rgba, load_rgba_from_bytes};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn create_test_image() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(60, 60, Rgba([0, 0, 0, 255]));
        for y in 15..45 {
            for x in 15..45 {
                img.put_pixel(x, y, Rgba([240, 200, 40, 255]));
            }
        }
        img
    }

    #[test]
    fn test_pipeline_basic() {
        let pipeline = Pipeline::builder().build().expect("default settings are valid");
        let result = pipeline.process(&create_test_image()).expect("Should process successfully");

        assert!(!result.particles.is_empty());
        assert_eq!(result.image_width, 60);
        assert_eq!(result.image_height, 60);
    }

    #[test]
    fn test_pipeline_with_outline_and_lines() {
        let pipeline = Pipeline::builder()
            .density(2.0)
            .threshold(10.0)
            .edge_settings(EdgeSamplingSettings {
                enabled: true,
                pure_outline: true,
                ..Default::default()
            })
            .line_mode(LineMode::Distance)
            .distance_ranges(vec![DistanceRange::new(0.0, 5.0)])
            .build()
            .unwrap();
        let result = pipeline.process(&create_test_image()).unwrap();

        let lines = result.lines.expect("lines enabled");
        assert!(!lines.is_empty());
        // Only the bright square's rim passes the threshold
        for i in 0..result.particles.count {
            let [x, y, _] = result.particles.position(i);
            assert!(x.abs() <= 16.0 && y.abs() <= 16.0);
        }
    }

    #[test]
    fn test_free_functions_match_sampler() {
        let image = create_test_image();
        let settings = SamplerSettings::default();
        let field = sample(&image, &settings).unwrap();
        assert_eq!(field.count, (60 / 2) * (60 / 2));
        assert!(build_lines(&field, &LineSettings::default()).is_none());
    }
}
