//! Dominant color extraction by k-means in HSL space.

use image::RgbaImage;
use rand::Rng;
use tracing::debug;

use crate::{
    color::{Hsl, hsl_to_rgb, hue_distance, rgb8_to_hsl, to_hex},
    settings::ColorTintMapping,
};

/// Upper bound on the number of pixels fed to the clustering.
pub const MAX_SAMPLES: usize = 10_000;
pub const MAX_ITERATIONS: usize = 20;
const CONVERGENCE_EPSILON: f32 = 0.001;
/// Weight of the hue term relative to saturation and lightness.
const HUE_WEIGHT: f32 = 4.0;

/// Weighted HSL distance with hue scaled to `0..=1` by its circular distance.
fn hsl_distance(a: &Hsl, b: &Hsl) -> f32 {
    let dh = hue_distance(a.h, b.h) / 180.0;
    let ds = a.s - b.s;
    let dl = a.l - b.l;
    HUE_WEIGHT * dh * dh + ds * ds + dl * dl
}

fn nearest_centroid(sample: &Hsl, centroids: &[Hsl]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| hsl_distance(sample, a).total_cmp(&hsl_distance(sample, b)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Collect chromatic, opaque pixels at a stride that bounds the sample count.
fn collect_samples(image: &RgbaImage) -> Vec<Hsl> {
    let total = (image.width() as usize) * (image.height() as usize);
    let stride = total.div_ceil(MAX_SAMPLES).max(1);

    image
        .pixels()
        .step_by(stride)
        .filter(|p| p[3] >= 128)
        .map(|p| rgb8_to_hsl(p[0], p[1], p[2]))
        .filter(|hsl| hsl.s >= 0.1 && (0.1..=0.9).contains(&hsl.l))
        .collect()
}

/// k-means++ style seeding: one random centroid, then repeatedly the sample
/// farthest from every centroid chosen so far.
fn seed_centroids<R: Rng + ?Sized>(samples: &[Hsl], k: usize, rng: &mut R) -> Vec<Hsl> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(samples[rng.gen_range(0..samples.len())]);

    while centroids.len() < k {
        let (mut best_dist, mut best_idx) = (-1.0f32, 0);
        for (i, sample) in samples.iter().enumerate() {
            let d = centroids
                .iter()
                .map(|c| hsl_distance(sample, c))
                .fold(f32::MAX, f32::min);
            if d > best_dist {
                best_dist = d;
                best_idx = i;
            }
        }
        centroids.push(samples[best_idx]);
    }

    centroids
}

/// Recompute one centroid: circular mean for hue, arithmetic for s and l.
fn mean_hsl(members: impl Iterator<Item = Hsl>) -> Option<Hsl> {
    let (mut sin, mut cos, mut s, mut l, mut n) = (0.0f32, 0.0f32, 0.0f32, 0.0f32, 0usize);
    for hsl in members {
        let rad = hsl.h.to_radians();
        sin += rad.sin();
        cos += rad.cos();
        s += hsl.s;
        l += hsl.l;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let n = n as f32;
    Some(Hsl {
        h: sin.atan2(cos).to_degrees().rem_euclid(360.0),
        s: s / n,
        l: l / n,
    })
}

/// Extract up to `k` dominant colors as tint mappings, most common first.
///
/// Returns an empty list when fewer than `k` usable pixels remain after
/// dropping transparent, near-black, near-white and near-gray pixels.
pub fn extract_dominant_colors<R: Rng + ?Sized>(
    image: &RgbaImage,
    k: usize,
    rng: &mut R,
) -> Vec<ColorTintMapping> {
    let samples = collect_samples(image);
    if k == 0 || samples.len() < k {
        debug!(samples = samples.len(), k, "not enough chromatic samples for clustering");
        return Vec::new();
    }

    let mut centroids = seed_centroids(&samples, k, rng);
    let mut assignments = vec![0usize; samples.len()];

    for iteration in 0..MAX_ITERATIONS {
        for (slot, sample) in assignments.iter_mut().zip(&samples) {
            *slot = nearest_centroid(sample, &centroids);
        }

        let mut converged = true;
        for (c, centroid) in centroids.iter_mut().enumerate() {
            let members = samples
                .iter()
                .zip(&assignments)
                .filter(|&(_, &a)| a == c)
                .map(|(s, _)| *s);
            let Some(updated) = mean_hsl(members) else {
                continue;
            };
            let hue_shift = hue_distance(updated.h, centroid.h) / 180.0;
            let sat_shift = (updated.s - centroid.s).abs();
            if hue_shift >= CONVERGENCE_EPSILON || sat_shift >= CONVERGENCE_EPSILON {
                converged = false;
            }
            *centroid = updated;
        }

        if converged {
            debug!(iteration, "k-means converged");
            break;
        }
    }

    let mut populations = vec![0usize; k];
    for sample in &samples {
        populations[nearest_centroid(sample, &centroids)] += 1;
    }

    let total = samples.len() as f32;
    let mut clusters: Vec<(usize, Hsl)> = populations
        .into_iter()
        .zip(centroids)
        .filter(|&(count, _)| count > 0)
        .collect();
    clusters.sort_by(|a, b| b.0.cmp(&a.0));

    clusters
        .into_iter()
        .map(|(count, centroid)| {
            let hex = to_hex(hsl_to_rgb(centroid));
            ColorTintMapping {
                source_hue: centroid.h,
                source_color: hex.clone(),
                target_color: hex,
                hue_spread: 1.0,
                percentage: count as f32 / total * 100.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::{SeedableRng, rngs::StdRng};

    fn two_tone(width: u32, height: u32) -> RgbaImage {
        // Left three quarters red, right quarter blue
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width * 3 / 4 { Rgba([220, 30, 30, 255]) } else { Rgba([30, 30, 220, 255]) }
        })
    }

    #[test]
    fn test_two_clusters_sorted_by_share() {
        let mut rng = StdRng::seed_from_u64(1);
        let mappings = extract_dominant_colors(&two_tone(40, 20), 2, &mut rng);

        assert_eq!(mappings.len(), 2);
        assert!(hue_distance(mappings[0].source_hue, 0.0) < 1.0);
        assert!(hue_distance(mappings[1].source_hue, 240.0) < 1.0);
        assert!((mappings[0].percentage - 75.0).abs() < 0.01);
        assert!((mappings[1].percentage - 25.0).abs() < 0.01);
        assert_eq!(mappings[0].source_color, mappings[0].target_color);
    }

    #[test]
    fn test_gray_image_yields_nothing() {
        let image = RgbaImage::from_pixel(20, 20, Rgba([128, 128, 128, 255]));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(extract_dominant_colors(&image, 3, &mut rng).is_empty());
    }

    #[test]
    fn test_fewer_samples_than_clusters() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([200, 20, 20, 255]));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(extract_dominant_colors(&image, 3, &mut rng).is_empty());
        assert!(extract_dominant_colors(&image, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_duplicate_centroids_collapse() {
        // Single hue with k = 3: identical seeds leave empty clusters, which are dropped
        let image = RgbaImage::from_pixel(10, 10, Rgba([30, 200, 30, 255]));
        let mut rng = StdRng::seed_from_u64(9);
        let mappings = extract_dominant_colors(&image, 3, &mut rng);
        assert_eq!(mappings.len(), 1);
        assert!((mappings[0].percentage - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_seeded_runs_match() {
        let image = two_tone(32, 32);
        let a = extract_dominant_colors(&image, 2, &mut StdRng::seed_from_u64(5));
        let b = extract_dominant_colors(&image, 2, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
