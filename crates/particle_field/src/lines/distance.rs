use tracing::warn;

use super::{EdgeSink, LineCandidates, range_fade};
use crate::{spatial::SpatialGrid, traits::LineAlgorithm};

/// Connects every sampled pair whose depth-weighted distance lies in an
/// enabled range.
///
/// Pairs are visited as `i < j` over the sampled order. The spatial grid only
/// skips pairs too far apart to match any range, so the visiting order (and
/// therefore which lines survive the budget) is that of the full pair loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceLines;

impl LineAlgorithm for DistanceLines {
    fn connect(&self, candidates: &LineCandidates<'_>, sink: &mut EdgeSink<'_>) {
        let Some(reach) = candidates.settings.max_range_distance() else {
            warn!("distance lines requested without an enabled range");
            return;
        };

        let points: Vec<[f32; 3]> = candidates
            .indices
            .iter()
            .map(|&i| candidates.weighted_position(i))
            .collect();
        let grid = SpatialGrid::from_points(&points, reach);

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
                if !candidates.colors_similar(a, b) {
                    continue;
                }
                let d = candidates.weighted_distance(a, b);
                if let Some(range) = candidates.settings.matching_range(d) {
                    sink.try_connect(a, b, range_fade(d, range));
                }
            }
        }
    }
}
