//! Configuration value objects.
//!
//! Every settings type is plain data with `serde` and `schemars` support so a
//! host application can persist it or expose it over any transport. Settings
//! are validated once at the entry boundary (`FieldSettings::validate`,
//! `SamplerSettings::validate`, `LineSettings::validate`); algorithms assume
//! validated input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::color::parse_hex;
use crate::error::{FieldError, Result};

/// Top-level settings for one sample + line build run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FieldSettings {
    pub sampler: SamplerSettings,
    pub lines: LineSettings,
    /// Seed for every random decision (fill thinning, shuffles, k-means init)
    pub seed: u64,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            sampler: SamplerSettings::default(),
            lines: LineSettings::default(),
            seed: 0x5eed,
        }
    }
}

impl FieldSettings {
    pub fn validate(&self) -> Result<()> {
        self.sampler.validate()?;
        self.lines.validate()
    }
}

fn invalid(message: impl Into<String>) -> FieldError {
    FieldError::InvalidSettings(message.into())
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(invalid(format!("{name} must be within {min}..={max}, got {value}")));
    }
    Ok(())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(format!("{name} must be a positive number, got {value}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SamplerSettings {
    /// Sampling stride in canvas pixels (floored, minimum 1)
    pub density: f32,
    /// Minimum channel-mean brightness (0-255) for a pixel to be emitted
    pub threshold: f32,
    /// Hard ceiling on the number of emitted particles
    pub max_particles: usize,
    /// Images whose longest side is smaller are scaled up to this size
    pub min_canvas_size: u32,
    /// Images whose longest side is larger are scaled down to this size
    pub max_canvas_size: u32,
    pub depth: DepthSettings,
    pub edge_sampling: EdgeSamplingSettings,
    pub crop: CropMode,
    pub color_filter: ColorFilterSettings,
    pub color_tint: ColorTintSettings,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            density: 2.0,
            threshold: 0.0,
            max_particles: 200_000,
            min_canvas_size: 1,
            max_canvas_size: 800,
            depth: DepthSettings::default(),
            edge_sampling: EdgeSamplingSettings::default(),
            crop: CropMode::default(),
            color_filter: ColorFilterSettings::default(),
            color_tint: ColorTintSettings::default(),
        }
    }
}

impl SamplerSettings {
    pub fn validate(&self) -> Result<()> {
        check_positive("density", self.density)?;
        check_range("threshold", self.threshold, 0.0, 255.0)?;
        if self.max_particles == 0 {
            return Err(invalid("max_particles must be at least 1"));
        }
        if self.max_canvas_size == 0 || self.min_canvas_size > self.max_canvas_size {
            return Err(invalid(format!(
                "canvas size bounds {}..={} are empty",
                self.min_canvas_size, self.max_canvas_size
            )));
        }
        self.depth.validate()?;
        self.edge_sampling.validate()?;
        self.crop.validate()?;
        self.color_filter.validate()?;
        self.color_tint.validate()
    }

    /// Sampling stride for the uniform pass.
    pub fn stride(&self) -> u32 {
        (self.density.floor() as u32).max(1)
    }
}

/// Depth mapping mode with its mode-specific parameters.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Default
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DepthMode {
    /// Brighter pixels sit further forward
    #[default]
    Brightness,
    /// Darker pixels sit further forward
    InverseBrightness,
    /// Depth follows hue around the color wheel
    Hue,
    /// Depth follows HSL saturation
    Saturation,
    /// Half brightness plus value noise
    Perlin { noise_strength: f32 },
    /// Center of the canvas forward, corners back
    Radial,
    /// Brightness quantized to four planes
    Layered,
    /// Local Sobel gradient of the source raster
    Emboss,
    /// Brightness blended with fractal noise
    Fbm { octaves: u32, noise_strength: f32 },
    /// Concentric sine rings around the canvas center
    Wave { frequency: f32, amplitude: f32 },
    /// Brightness depth plus a horizontal parallax offset
    Stereo { separation: f32 },
}

impl DepthMode {
    /// Get a description of the mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Brightness => "z = brightness * range",
            Self::InverseBrightness => "z = (1 - brightness) * range",
            Self::Hue => "z = hue / 360 * range",
            Self::Saturation => "z = saturation * range",
            Self::Perlin { .. } => "z = brightness * range / 2 + noise * strength",
            Self::Radial => "z = (1 - dist / max_dist) * range",
            Self::Layered => "z = quantized brightness (4 levels) * range",
            Self::Emboss => "z = local Sobel gradient * range",
            Self::Fbm { .. } => "z = 0.3 brightness + 0.7 fractal noise",
            Self::Wave { .. } => "z = 0.5 (1 + sin(dist * frequency)) * range * amplitude",
            Self::Stereo { .. } => "z = brightness * range, x shifted by depth",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DepthSettings {
    pub mode: DepthMode,
    /// Scale of the depth axis in canvas units
    pub depth_range: f32,
    /// Negates every emitted depth value
    pub invert: bool,
}

impl Default for DepthSettings {
    fn default() -> Self {
        Self {
            mode: DepthMode::Brightness,
            depth_range: 100.0,
            invert: false,
        }
    }
}

impl DepthSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.depth_range.is_finite() {
            return Err(invalid("depth_range must be finite"));
        }
        match self.mode {
            DepthMode::Perlin { noise_strength } => {
                check_range("noise_strength", noise_strength, 0.0, f32::MAX)
            }
            DepthMode::Fbm { octaves, noise_strength } => {
                if octaves == 0 || octaves > 12 {
                    return Err(invalid(format!(
                        "fbm octaves must be within 1..=12, got {octaves}"
                    )));
                }
                check_range("noise_strength", noise_strength, 0.0, f32::MAX)
            }
            DepthMode::Wave { frequency, amplitude } => {
                check_range("wave frequency", frequency, 0.0, f32::MAX)?;
                check_range("wave amplitude", amplitude, f32::MIN, f32::MAX)
            }
            DepthMode::Stereo { separation } => {
                check_range("stereo separation", separation, f32::MIN, f32::MAX)
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EdgeSamplingSettings {
    pub enabled: bool,
    /// Minimum edge strength (0-1) for a pixel to count as an edge
    pub edge_sensitivity: f32,
    /// Edge pass stride is `stride / edge_density_boost`
    pub edge_density_boost: f32,
    /// Fill pass stride is `stride / fill_density`, and fill pixels are kept
    /// with probability `fill_density`
    pub fill_density: f32,
    /// Skip the fill pass entirely
    pub pure_outline: bool,
}

impl Default for EdgeSamplingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            edge_sensitivity: 0.2,
            edge_density_boost: 2.0,
            fill_density: 0.3,
            pure_outline: false,
        }
    }
}

impl EdgeSamplingSettings {
    pub fn validate(&self) -> Result<()> {
        check_range("edge_sensitivity", self.edge_sensitivity, 0.0, 1.0)?;
        check_positive("edge_density_boost", self.edge_density_boost)?;
        check_range("fill_density", self.fill_density, 0.0, 1.0)
    }
}

/// Region of the canvas that may be sampled.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CropMode {
    /// Symmetric margin of `edge_percent` of the width/height on each side
    Rectangular { edge_percent: f32 },
    /// Disk of radius `min(w, h) / 2 * (1 - edge_percent / 100)`
    Circular { edge_percent: f32 },
}

impl Default for CropMode {
    fn default() -> Self {
        Self::Rectangular { edge_percent: 0.0 }
    }
}

impl CropMode {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Rectangular { edge_percent } => {
                check_range("edge_percent", edge_percent, 0.0, 50.0)
            }
            Self::Circular { edge_percent } => {
                check_range("edge_percent", edge_percent, 0.0, 100.0)
            }
        }
    }
}

/// A hue interval in degrees. `start > end` wraps through 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HueRange {
    pub hue_start: f32,
    pub hue_end: f32,
}

impl HueRange {
    pub fn new(hue_start: f32, hue_end: f32) -> Self {
        Self { hue_start, hue_end }
    }

    pub fn contains(&self, hue: f32) -> bool {
        if self.hue_start <= self.hue_end {
            hue >= self.hue_start && hue <= self.hue_end
        } else {
            hue >= self.hue_start || hue <= self.hue_end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColorFilterSettings {
    pub enabled: bool,
    pub filters: Vec<HueRange>,
    /// Pixels with saturation outside `saturation_min..=saturation_max`
    /// bypass the hue filter and are always kept
    pub saturation_min: f32,
    pub saturation_max: f32,
    /// Keep matching pixels instead of excluding them
    pub invert_mode: bool,
}

impl Default for ColorFilterSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            filters: Vec::new(),
            saturation_min: 0.0,
            saturation_max: 1.0,
            invert_mode: false,
        }
    }
}

impl ColorFilterSettings {
    pub fn validate(&self) -> Result<()> {
        check_range("saturation_min", self.saturation_min, 0.0, 1.0)?;
        check_range("saturation_max", self.saturation_max, 0.0, 1.0)?;
        if self.saturation_min > self.saturation_max {
            return Err(invalid("saturation_min must not exceed saturation_max"));
        }
        for range in &self.filters {
            check_range("hue_start", range.hue_start, 0.0, 360.0)?;
            check_range("hue_end", range.hue_end, 0.0, 360.0)?;
        }
        Ok(())
    }
}

/// Maps one source hue onto a target color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColorTintMapping {
    /// Hue in degrees this mapping is anchored on
    pub source_hue: f32,
    /// Hex color the mapping was extracted from
    pub source_color: String,
    /// Hex color the source hue is moved to
    pub target_color: String,
    /// Scale factor applied to the hue offset from `source_hue`
    pub hue_spread: f32,
    /// Share of sampled pixels in this cluster, 0-100 (informational)
    pub percentage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColorTintSettings {
    pub enabled: bool,
    pub mappings: Vec<ColorTintMapping>,
    /// Blend between the original (0) and fully tinted (1) color
    pub global_strength: f32,
}

impl Default for ColorTintSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mappings: Vec::new(),
            global_strength: 1.0,
        }
    }
}

impl ColorTintSettings {
    pub fn validate(&self) -> Result<()> {
        check_range("global_strength", self.global_strength, 0.0, 1.0)?;
        for mapping in &self.mappings {
            check_range("source_hue", mapping.source_hue, 0.0, 360.0)?;
            if !mapping.hue_spread.is_finite() {
                return Err(invalid("hue_spread must be finite"));
            }
            parse_hex(&mapping.target_color).map_err(|e| invalid(e.to_string()))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// Connectivity algorithm with its mode-specific parameters.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Default
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LineMode {
    /// Connect pairs whose depth-weighted distance falls in an enabled range
    #[default]
    Distance,
    /// Connect nearby pairs with similar colors
    Color {
        /// Maximum normalized RGB distance (0-1)
        color_threshold: f32,
        /// Scales the largest enabled range max into the distance cutoff
        distance_multiplier: f32,
    },
    /// Connect every particle to its `k` nearest neighbours
    Knn { k: usize },
    /// Connect the edges of a Delaunay triangulation of the XY projection
    Delaunay,
}

impl LineMode {
    /// Get a description of the mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Distance => "Pairs within any enabled distance range",
            Self::Color { .. } => "Nearby pairs whose colors are similar",
            Self::Knn { .. } => "Each particle linked to its k nearest neighbours",
            Self::Delaunay => "Edges of a Delaunay triangulation of the XY plane",
        }
    }
}

/// A distance interval; several enabled ranges form a union.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DistanceRange {
    pub min: f32,
    pub max: f32,
    pub enabled: bool,
}

impl DistanceRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max, enabled: true }
    }

    pub fn contains(&self, distance: f32) -> bool {
        self.enabled && distance >= self.min && distance <= self.max
    }
}

/// Size gates applied to particles before any pairing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SizeFilter {
    /// Absolute size floor
    pub min_size: Option<f32>,
    /// Floor as a fraction of the largest particle size
    pub min_relative_size: Option<f32>,
    /// Floor at this percentile (0-100) of the particle sizes
    pub min_percentile: Option<f32>,
}

impl SizeFilter {
    pub fn is_active(&self) -> bool {
        self.min_size.is_some() || self.min_relative_size.is_some() || self.min_percentile.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LineSettings {
    pub enabled: bool,
    pub mode: LineMode,
    pub distance_ranges: Vec<DistanceRange>,
    /// Hard ceiling on the number of emitted lines
    pub max_lines: usize,
    /// Fraction of particles considered for pairing, `(0, 1]`
    pub sample_ratio: f32,
    /// Scale applied to the depth delta before combining with X/Y
    pub z_depth_weight: f32,
    /// When set, pairs must have normalized RGB distance at most this value
    pub color_similarity: Option<f32>,
    /// When set, no particle takes part in more lines than this
    pub max_connections: Option<u32>,
    pub size_filter: SizeFilter,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: LineMode::Distance,
            distance_ranges: vec![DistanceRange::new(0.0, 30.0)],
            max_lines: 5_000,
            sample_ratio: 1.0,
            z_depth_weight: 1.0,
            color_similarity: None,
            max_connections: None,
            size_filter: SizeFilter::default(),
        }
    }
}

impl LineSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_ratio > 0.0 && self.sample_ratio <= 1.0) {
            return Err(invalid(format!(
                "sample_ratio must be within (0, 1], got {}",
                self.sample_ratio
            )));
        }
        check_range("z_depth_weight", self.z_depth_weight, 0.0, f32::MAX)?;
        for range in &self.distance_ranges {
            let finite = range.min.is_finite() && range.max.is_finite();
            if !finite || range.min < 0.0 || range.min > range.max {
                return Err(invalid(format!(
                    "invalid distance range {}..={}",
                    range.min, range.max
                )));
            }
        }
        if let Some(tolerance) = self.color_similarity {
            check_range("color_similarity", tolerance, 0.0, 1.0)?;
        }
        if let Some(p) = self.size_filter.min_percentile {
            check_range("min_percentile", p, 0.0, 100.0)?;
        }
        if let Some(r) = self.size_filter.min_relative_size {
            check_range("min_relative_size", r, 0.0, 1.0)?;
        }
        match self.mode {
            LineMode::Color { color_threshold, distance_multiplier } => {
                check_range("color_threshold", color_threshold, 0.0, 1.0)?;
                check_positive("distance_multiplier", distance_multiplier)
            }
            LineMode::Knn { k } if k == 0 => Err(invalid("knn k must be at least 1")),
            _ => Ok(()),
        }
    }

    /// Enabled distance ranges in configuration order.
    pub fn active_ranges(&self) -> impl Iterator<Item = &DistanceRange> {
        self.distance_ranges.iter().filter(|r| r.enabled)
    }

    /// Largest `max` among enabled ranges.
    pub fn max_range_distance(&self) -> Option<f32> {
        self.active_ranges().map(|r| r.max).reduce(f32::max)
    }

    /// First enabled range containing `distance`.
    pub fn matching_range(&self, distance: f32) -> Option<&DistanceRange> {
        self.active_ranges().find(|r| r.contains(distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_validate() {
        FieldSettings::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn test_hue_range_wraparound() {
        let range = HueRange::new(330.0, 30.0);
        assert!(range.contains(350.0));
        assert!(range.contains(10.0));
        assert!(!range.contains(180.0));
        assert!(HueRange::new(0.0, 60.0).contains(0.0));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = SamplerSettings { density: 0.0, ..Default::default() };
        assert!(matches!(settings.validate(), Err(FieldError::InvalidSettings(_))));

        settings.density = 1.0;
        settings.color_tint.mappings.push(ColorTintMapping {
            source_hue: 10.0,
            source_color: "#ff0000".into(),
            target_color: "not-a-color".into(),
            hue_spread: 1.0,
            percentage: 100.0,
        });
        assert!(settings.validate().is_err());

        let lines = LineSettings { mode: LineMode::Knn { k: 0 }, ..Default::default() };
        assert!(lines.validate().is_err());

        let lines = LineSettings { sample_ratio: 0.0, ..Default::default() };
        assert!(lines.validate().is_err());
    }

    #[test]
    fn test_stride_floors_density() {
        let settings = SamplerSettings { density: 3.7, ..Default::default() };
        assert_eq!(settings.stride(), 3);
        let settings = SamplerSettings { density: 0.4, ..Default::default() };
        assert_eq!(settings.stride(), 1);
    }

    #[test]
    fn test_matching_range_skips_disabled() {
        let lines = LineSettings {
            distance_ranges: vec![
                DistanceRange { min: 0.0, max: 10.0, enabled: false },
                DistanceRange::new(5.0, 20.0),
            ],
            ..Default::default()
        };
        assert_eq!(lines.matching_range(7.0).map(|r| r.min), Some(5.0));
        assert_eq!(lines.max_range_distance(), Some(20.0));
        assert!(lines.matching_range(25.0).is_none());
    }

    #[test]
    fn test_mode_json_uses_type_and_params() {
        let wave = DepthMode::Wave { frequency: 0.05, amplitude: 1.0 };
        let json = serde_json::to_value(wave).unwrap();
        assert_eq!(json["type"], "wave");
        assert_eq!(json["params"]["frequency"], 0.05f32 as f64);

        let parsed: LineMode = serde_json::from_str(r#"{"type":"knn","params":{"k":3}}"#).unwrap();
        assert_eq!(parsed, LineMode::Knn { k: 3 });

        let unit: LineMode = serde_json::from_str(r#"{"type":"delaunay"}"#).unwrap();
        assert_eq!(unit, LineMode::Delaunay);
    }

    #[test]
    fn test_mode_names_from_strum() {
        assert_eq!(
            DepthMode::from_str("inverse_brightness").unwrap(),
            DepthMode::InverseBrightness
        );
        assert_eq!(LineMode::Delaunay.to_string(), "delaunay");
        assert_eq!(<DepthMode as VariantNames>::VARIANTS.len(), 11);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: FieldSettings =
            serde_json::from_str(r#"{"sampler":{"density":1.0},"seed":7}"#).unwrap();
        assert_eq!(settings.sampler.density, 1.0);
        assert_eq!(settings.sampler.max_particles, 200_000);
        assert_eq!(settings.seed, 7);
        assert!(!settings.lines.enabled);
    }
}
