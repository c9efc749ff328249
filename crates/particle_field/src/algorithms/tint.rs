use crate::{
    color::{Hsl, hsl_to_rgb, hue_delta, hue_distance, parse_hex, rgb_to_hsl},
    error::{FieldError, Result},
    settings::ColorTintSettings,
    traits::ColorTransform,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct TintEntry {
    source_hue: f32,
    target_hue: f32,
    /// Achromatic targets (gray/black/white) desaturate instead of rotating
    target_is_gray: bool,
    hue_spread: f32,
}

/// Resolved hue remapping table built from `ColorTintSettings`.
#[derive(Debug, Clone, PartialEq)]
pub struct TintTable {
    entries: Vec<TintEntry>,
    strength: f32,
}

impl TintTable {
    pub fn new(settings: &ColorTintSettings) -> Result<Self> {
        if !settings.enabled {
            return Ok(Self::identity());
        }

        let entries = settings
            .mappings
            .iter()
            .map(|mapping| {
                let [r, g, b] = parse_hex(&mapping.target_color)
                    .map_err(|e| FieldError::InvalidSettings(e.to_string()))?;
                let target = rgb_to_hsl(r, g, b);
                Ok(TintEntry {
                    source_hue: mapping.source_hue,
                    target_hue: target.h,
                    target_is_gray: target.s == 0.0,
                    hue_spread: mapping.hue_spread,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            entries,
            strength: settings.global_strength,
        })
    }

    pub fn identity() -> Self {
        Self { entries: Vec::new(), strength: 0.0 }
    }

    pub fn is_identity(&self) -> bool {
        self.entries.is_empty() || self.strength == 0.0
    }

    fn nearest(&self, hue: f32) -> Option<&TintEntry> {
        self.entries.iter().min_by(|a, b| {
            hue_distance(hue, a.source_hue).total_cmp(&hue_distance(hue, b.source_hue))
        })
    }
}

impl ColorTransform for TintTable {
    fn transform(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.is_identity() {
            return rgb;
        }

        let hsl = rgb_to_hsl(rgb[0], rgb[1], rgb[2]);
        let Some(entry) = self.nearest(hsl.h) else {
            return rgb;
        };

        let tinted = if entry.target_is_gray {
            hsl_to_rgb(Hsl { h: 0.0, s: 0.0, l: hsl.l })
        } else {
            let h = entry.target_hue + hue_delta(entry.source_hue, hsl.h) * entry.hue_spread;
            hsl_to_rgb(Hsl { h, ..hsl })
        };

        let t = self.strength;
        [0, 1, 2].map(|i| (rgb[i] + (tinted[i] - rgb[i]) * t).clamp(0.0, 1.0))
    }
}
