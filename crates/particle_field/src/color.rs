//! Color transform utilities.
//!
//! Channels are `f32` in `0.0..=1.0` unless stated otherwise. Hue is expressed
//! in degrees (`0.0..360.0`), saturation and lightness in `0.0..=1.0`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a hex color string cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid hex color: {0:?}")]
pub struct ParseColorError(pub String);

/// A color in hue/saturation/lightness form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Hue in degrees, `0.0..360.0`
    pub h: f32,
    /// Saturation, `0.0..=1.0`
    pub s: f32,
    /// Lightness, `0.0..=1.0`
    pub l: f32,
}

/// Convert RGB channels to HSL.
///
/// Achromatic colors (all channels equal) report a hue and saturation of 0.
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> Hsl {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl { h: h * 60.0, s, l }
}

/// Convert 8-bit RGB channels to HSL.
#[inline]
pub fn rgb8_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    rgb_to_hsl(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Convert HSL back to RGB channels. Hue wraps modulo 360.
pub fn hsl_to_rgb(hsl: Hsl) -> [f32; 3] {
    let Hsl { h, s, l } = hsl;
    if s == 0.0 {
        return [l, l, l];
    }

    let h = h.rem_euclid(360.0) / 360.0;
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

/// Shortest angular distance between two hues, in `0.0..=180.0`.
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Signed shortest hue delta `to - from`, in `-180.0..=180.0`.
pub fn hue_delta(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Euclidean RGB distance normalized to `0.0..=1.0`.
pub fn rgb_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    (dr * dr + dg * dg + db * db).sqrt() / 3.0f32.sqrt()
}

/// Rec. 601 luma of 8-bit channels, `0.0..=255.0`.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Parse `#RRGGBB`, `RRGGBB` or `#RGB` into RGB channels.
pub fn parse_hex(s: &str) -> Result<[f32; 3], ParseColorError> {
    let digits = s.trim().trim_start_matches('#');
    let err = || ParseColorError(s.to_string());
    if !digits.is_ascii() {
        return Err(err());
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(err()),
    };

    let mut channels = [0.0f32; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16).map_err(|_| err())?;
        *channel = byte as f32 / 255.0;
    }
    Ok(channels)
}

/// Format RGB channels as lowercase `#rrggbb`, rounding and clamping.
pub fn to_hex(rgb: [f32; 3]) -> String {
    let [r, g, b] = rgb.map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8);
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_primary_hues() {
        assert!(close(rgb_to_hsl(1.0, 0.0, 0.0).h, 0.0));
        assert!(close(rgb_to_hsl(0.0, 1.0, 0.0).h, 120.0));
        assert!(close(rgb_to_hsl(0.0, 0.0, 1.0).h, 240.0));
        assert!(close(rgb_to_hsl(0.0, 1.0, 1.0).h, 180.0));
        assert!(close(rgb_to_hsl(1.0, 0.0, 1.0).h, 300.0));
    }

    #[test]
    fn test_gray_is_achromatic() {
        let hsl = rgb_to_hsl(0.5, 0.5, 0.5);
        assert_eq!(hsl.s, 0.0);
        assert!(close(hsl.l, 0.5));
        assert_eq!(hsl_to_rgb(hsl), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_hsl_round_trip_orange() {
        let rgb = [1.0, 0.5, 0.25];
        let back = hsl_to_rgb(rgb_to_hsl(rgb[0], rgb[1], rgb[2]));
        for i in 0..3 {
            assert!(close(rgb[i], back[i]), "{rgb:?} vs {back:?}");
        }
    }

    #[test]
    fn test_hue_distance_wraps() {
        assert!(close(hue_distance(350.0, 10.0), 20.0));
        assert!(close(hue_distance(10.0, 350.0), 20.0));
        assert!(close(hue_distance(0.0, 180.0), 180.0));
        assert!(close(hue_delta(350.0, 10.0), 20.0));
        assert!(close(hue_delta(10.0, 350.0), -20.0));
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(parse_hex("#ff0000").unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(parse_hex("00ff00").unwrap(), [0.0, 1.0, 0.0]);
        assert_eq!(parse_hex("#00f").unwrap(), [0.0, 0.0, 1.0]);
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#gg0000").is_err());
        assert_eq!(to_hex([1.0, 0.5, 0.0]), "#ff8000");
    }

    #[test]
    fn test_rgb_distance_normalized() {
        assert_eq!(rgb_distance([0.0; 3], [0.0; 3]), 0.0);
        assert!(close(rgb_distance([0.0; 3], [1.0; 3]), 1.0));
    }
}
