use crate::{
    color::rgb8_to_hsl,
    settings::{ColorFilterSettings, CropMode},
    traits::PixelFilter,
};

/// Hue-interval color filter
#[derive(Debug, Clone)]
pub struct ColorFilter {
    pub settings: ColorFilterSettings,
}

impl ColorFilter {
    pub fn new(settings: ColorFilterSettings) -> Self {
        Self { settings }
    }

    /// Whether the filter removes a pixel of this color.
    ///
    /// Pixels outside the saturation gate are never excluded. Inside the gate
    /// a hue match excludes the pixel, or with `invert_mode` a hue miss does.
    pub fn excludes(&self, r: u8, g: u8, b: u8) -> bool {
        let settings = &self.settings;
        if !settings.enabled {
            return false;
        }

        let hsl = rgb8_to_hsl(r, g, b);
        if hsl.s < settings.saturation_min || hsl.s > settings.saturation_max {
            return false;
        }

        let matched = settings.filters.iter().any(|range| range.contains(hsl.h));
        matched != settings.invert_mode
    }
}

impl PixelFilter for ColorFilter {
    fn keeps(&self, _x: u32, _y: u32, rgba: [u8; 4]) -> bool {
        !self.excludes(rgba[0], rgba[1], rgba[2])
    }
}

/// Rectangular or circular sampling region on the canvas
#[derive(Debug, Clone, Copy)]
pub enum CropRegion {
    Rectangle { min_x: f32, min_y: f32, max_x: f32, max_y: f32 },
    Disk { cx: f32, cy: f32, radius: f32 },
}

impl CropRegion {
    pub fn new(mode: CropMode, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        match mode {
            CropMode::Rectangular { edge_percent } => {
                let mx = w * edge_percent / 100.0;
                let my = h * edge_percent / 100.0;
                Self::Rectangle { min_x: mx, min_y: my, max_x: w - mx, max_y: h - my }
            }
            CropMode::Circular { edge_percent } => Self::Disk {
                cx: w / 2.0,
                cy: h / 2.0,
                radius: w.min(h) / 2.0 * (1.0 - edge_percent / 100.0),
            },
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        let (x, y) = (x as f32, y as f32);
        match *self {
            Self::Rectangle { min_x, min_y, max_x, max_y } => {
                x >= min_x && x < max_x && y >= min_y && y < max_y
            }
            Self::Disk { cx, cy, radius } => {
                let dx = x - cx;
                let dy = y - cy;
                dx * dx + dy * dy <= radius * radius
            }
        }
    }
}

impl PixelFilter for CropRegion {
    fn keeps(&self, x: u32, y: u32, _rgba: [u8; 4]) -> bool {
        self.contains(x, y)
    }
}
