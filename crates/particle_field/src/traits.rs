use crate::lines::{EdgeSink, LineCandidates};

/// Trait for per-pixel inclusion decisions (color filtering, cropping)
pub trait PixelFilter: Send + Sync {
    /// Whether the canvas pixel at `(x, y)` with color `rgba` may be sampled
    fn keeps(&self, x: u32, y: u32, rgba: [u8; 4]) -> bool;
}

/// Trait for color transforms applied to emitted particles
pub trait ColorTransform: Send + Sync {
    /// Transform RGB channels in `0.0..=1.0`
    fn transform(&self, rgb: [f32; 3]) -> [f32; 3];
}

/// Trait for line connectivity algorithms
pub trait LineAlgorithm: Send + Sync {
    /// Offer candidate pairs to the sink; the sink enforces shared limits
    fn connect(&self, candidates: &LineCandidates<'_>, sink: &mut EdgeSink<'_>);
}
