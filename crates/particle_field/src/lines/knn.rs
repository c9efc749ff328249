use std::{cmp::Ordering, collections::HashSet};

use super::{EdgeSink, LineCandidates, smoothstep};
use crate::{spatial::SpatialGrid, traits::LineAlgorithm};

/// Links each sampled particle to its `k` nearest sampled neighbours.
///
/// Neighbour lists are not symmetric; a pair found from both ends is emitted
/// once. Fade runs from 1 at zero distance to 0.5 at the k-th neighbour.
///
/// Neighbours are searched ring by ring on a spatial grid, widening until the
/// k-th candidate is closer than any unvisited cell could be. Equal distances
/// resolve to the earlier sampled particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnLines {
    pub k: usize,
}

/// Cell edge that puts roughly `k` points in each cell of a flat field.
fn cell_size_for(points: &[[f32; 3]], k: usize) -> f32 {
    let mut lo = [f32::INFINITY; 3];
    let mut hi = [f32::NEG_INFINITY; 3];
    for p in points {
        for axis in 0..3 {
            lo[axis] = lo[axis].min(p[axis]);
            hi[axis] = hi[axis].max(p[axis]);
        }
    }
    let extent = (0..3).map(|axis| hi[axis] - lo[axis]).fold(0.0, f32::max);
    let cells_per_side = (points.len() as f32 / k.max(1) as f32).sqrt().max(1.0);
    extent / cells_per_side
}

fn nearest_first(x: &(f32, usize), y: &(f32, usize)) -> Ordering {
    x.0.total_cmp(&y.0).then(x.1.cmp(&y.1))
}

impl KnnLines {
    /// The `k` nearest `(distance, slot)` pairs around `slot_a`, nearest first.
    fn nearest(
        &self,
        candidates: &LineCandidates<'_>,
        grid: &SpatialGrid,
        origin: [f32; 3],
        slot_a: usize,
        out: &mut Vec<(f32, usize)>,
    ) {
        out.clear();
        let a = candidates.indices[slot_a];

        for radius in 0..=grid.covering_radius(origin) {
            for slot_b in grid.ring(origin, radius) {
                let b = candidates.indices[slot_b];
                if slot_b != slot_a && candidates.colors_similar(a, b) {
                    out.push((candidates.weighted_distance(a, b), slot_b));
                }
            }
            if out.len() >= self.k {
                out.select_nth_unstable_by(self.k - 1, nearest_first);
                let kth = out[self.k - 1].0;
                if kth <= radius as f32 * grid.cell_size() {
                    break;
                }
            }
        }

        out.sort_by(nearest_first);
        out.truncate(self.k);
    }
}

impl LineAlgorithm for KnnLines {
    fn connect(&self, candidates: &LineCandidates<'_>, sink: &mut EdgeSink<'_>) {
        if self.k == 0 {
            return;
        }

        let points: Vec<[f32; 3]> = candidates
            .indices
            .iter()
            .map(|&i| candidates.weighted_position(i))
            .collect();
        let grid = SpatialGrid::from_points(&points, cell_size_for(&points, self.k));

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut neighbours: Vec<(f32, usize)> = Vec::new();

        for (slot_a, &a) in candidates.indices.iter().enumerate() {
            if sink.is_full() {
                break;
            }
            if sink.at_capacity(a) {
                continue;
            }

            self.nearest(candidates, &grid, points[slot_a], slot_a, &mut neighbours);
            let Some(&(kth, _)) = neighbours.last() else {
                continue;
            };

            for &(d, slot_b) in &neighbours {
                let b = candidates.indices[slot_b];
                let key = (a.min(b), a.max(b));
                if seen.contains(&key) {
                    continue;
                }
                let fade = if kth > 0.0 { 1.0 - 0.5 * smoothstep(d / kth) } else { 1.0 };
                if sink.try_connect(a, b, fade) {
                    seen.insert(key);
                }
                if sink.is_full() {
                    return;
                }
            }
        }
    }
}
