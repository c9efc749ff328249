use tracing::warn;

use super::{EdgeSink, LineCandidates, smoothstep};
use crate::{color::rgb_distance, spatial::SpatialGrid, traits::LineAlgorithm};

/// Connects nearby pairs whose colors are close.
///
/// The cutoff is the largest enabled range scaled by `distance_multiplier`;
/// distance is plain 3D Euclidean and lines fade smoothly towards the cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorLines {
    pub color_threshold: f32,
    pub distance_multiplier: f32,
}

impl LineAlgorithm for ColorLines {
    fn connect(&self, candidates: &LineCandidates<'_>, sink: &mut EdgeSink<'_>) {
        let Some(reach) = candidates.settings.max_range_distance() else {
            warn!("color lines requested without an enabled range");
            return;
        };
        let cutoff = reach * self.distance_multiplier;

        let field = candidates.field;
        let points: Vec<[f32; 3]> = candidates.indices.iter().map(|&i| field.position(i)).collect();
        let grid = SpatialGrid::from_points(&points, cutoff);

        'outer: for (slot_a, &a) in candidates.indices.iter().enumerate() {
            if sink.is_full() {
                break;
            }
            if sink.at_capacity(a) {
                continue;
            }

            let mut later: Vec<usize> = grid
                .neighbors(points[slot_a])
                .into_iter()
                .filter(|&slot| slot > slot_a)
                .collect();
            later.sort_unstable();

            for slot_b in later {
                if sink.is_full() {
                    break 'outer;
                }
                if sink.at_capacity(a) {
                    break;
                }
                let b = candidates.indices[slot_b];
                let d = candidates.distance(a, b);
                if d > cutoff {
                    continue;
                }
                if rgb_distance(field.color(a), field.color(b)) >= self.color_threshold
                    || !candidates.colors_similar(a, b)
                {
                    continue;
                }
                let fade = if cutoff > 0.0 { 1.0 - smoothstep(d / cutoff) } else { 1.0 };
                sink.try_connect(a, b, fade);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        lines::build_lines,
        settings::{DistanceRange, LineMode, LineSettings},
        types::ParticleField,
    };

    fn color_settings(threshold: f32, multiplier: f32) -> LineSettings {
        LineSettings {
            enabled: true,
            mode: LineMode::Color { color_threshold: threshold, distance_multiplier: multiplier },
            distance_ranges: vec![DistanceRange::new(0.0, 10.0)],
            ..Default::default()
        }
    }

    fn mixed_field() -> ParticleField {
        ParticleField::from_particles(&[
            ([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], 1.0),
            ([5.0, 0.0, 0.0], [0.9, 0.0, 0.0], 1.0),
            ([5.0, 5.0, 0.0], [0.0, 0.0, 1.0], 1.0),
            ([15.0, 0.0, 0.0], [1.0, 0.0, 0.0], 1.0),
        ])
    }

    #[test]
    fn test_similar_nearby_colors_connect() {
        let graph = build_lines(&mixed_field(), &color_settings(0.2, 1.0)).unwrap();

        // 0-1 is near and similar; 2 is blue; 3 sits beyond the cutoff from 0 but 10 from 1
        assert!(graph.connects(0, 1));
        assert!(graph.connects(1, 3));
        assert!(!graph.connects(0, 3));
        assert!(graph.pairs.iter().all(|p| !p.contains(&2)));
    }

    #[test]
    fn test_multiplier_extends_cutoff() {
        let graph = build_lines(&mixed_field(), &color_settings(0.2, 2.0)).unwrap();
        assert!(graph.connects(0, 3));
    }

    #[test]
    fn test_fade_decreases_with_distance() {
        let field = ParticleField::from_particles(&[
            ([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], 1.0),
            ([5.0, 0.0, 0.0], [1.0, 1.0, 1.0], 1.0),
        ]);
        let graph = build_lines(&field, &color_settings(0.5, 1.0)).unwrap();
        assert_eq!(graph.count, 1);
        // smoothstep(0.5) = 0.5
        assert!((graph.colors[0] - 0.5).abs() < 1e-5);
    }
}
