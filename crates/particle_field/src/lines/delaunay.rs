//! Delaunay connectivity over the XY projection of the particles.

use std::collections::{HashMap, HashSet};

use geo_types::{Coord, coord};
use tracing::{debug, warn};

use super::{EdgeSink, LineCandidates, range_fade};
use crate::traits::LineAlgorithm;

/// Default cap on the number of points fed to the triangulation.
pub const MAX_TRIANGULATION_POINTS: usize = 3_000;
/// Circumcircle determinant below which a triangle counts as degenerate.
const DEGENERATE_EPSILON: f64 = 1e-12;
const INSIDE_EPSILON: f64 = 1e-10;
/// Super-triangle extent in multiples of the bounding box.
const SUPER_SCALE: f64 = 20.0;

/// A triangulation input point tagged with the particle it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub coord: Coord<f64>,
    pub particle: usize,
}

impl Point2D {
    pub fn new(x: f64, y: f64, particle: usize) -> Self {
        Self { coord: coord! { x: x, y: y }, particle }
    }
}

/// Triangle as indices into the point slice given to [`triangulate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub vertices: [usize; 3],
}

impl Triangle {
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

#[derive(Debug, Clone, Copy)]
struct Circle {
    center: Coord<f64>,
    radius_sq: f64,
}

impl Circle {
    /// `None` for collinear or coincident vertices.
    fn through(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> Option<Self> {
        let (bx, by) = (b.x - a.x, b.y - a.y);
        let (cx, cy) = (c.x - a.x, c.y - a.y);
        let det = 2.0 * (bx * cy - by * cx);
        if det.abs() < DEGENERATE_EPSILON {
            return None;
        }
        let b_sq = bx * bx + by * by;
        let c_sq = cx * cx + cy * cy;
        let ux = (cy * b_sq - by * c_sq) / det;
        let uy = (bx * c_sq - cx * b_sq) / det;
        Some(Self {
            center: coord! { x: a.x + ux, y: a.y + uy },
            radius_sq: ux * ux + uy * uy,
        })
    }

    fn strictly_contains(&self, p: Coord<f64>) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        dx * dx + dy * dy < self.radius_sq - INSIDE_EPSILON
    }
}

struct Working {
    vertices: [usize; 3],
    circle: Option<Circle>,
}

impl Working {
    fn new(vertices: [usize; 3], coords: &[Coord<f64>]) -> Self {
        let [a, b, c] = vertices;
        Self { vertices, circle: Circle::through(coords[a], coords[b], coords[c]) }
    }
}

/// Bowyer-Watson triangulation of `points`.
///
/// Points sharing exact coordinates with an earlier point are skipped.
/// Triangles touching the enclosing super-triangle and degenerate triangles
/// are dropped from the result.
pub fn triangulate(points: &[Point2D]) -> Vec<Triangle> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for p in points {
        min_x = min_x.min(p.coord.x);
        min_y = min_y.min(p.coord.y);
        max_x = max_x.max(p.coord.x);
        max_y = max_y.max(p.coord.y);
    }
    let delta = (max_x - min_x).max(max_y - min_y).max(1.0);
    let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    let mut coords: Vec<Coord<f64>> = points.iter().map(|p| p.coord).collect();
    coords.push(coord! { x: mid_x - SUPER_SCALE * delta, y: mid_y - delta });
    coords.push(coord! { x: mid_x, y: mid_y + SUPER_SCALE * delta });
    coords.push(coord! { x: mid_x + SUPER_SCALE * delta, y: mid_y - delta });

    let mut triangles = vec![Working::new([n, n + 1, n + 2], &coords)];
    let mut inserted: HashSet<(u64, u64)> = HashSet::with_capacity(n);

    for (i, p) in points.iter().enumerate() {
        if !inserted.insert((p.coord.x.to_bits(), p.coord.y.to_bits())) {
            continue;
        }

        let bad: Vec<bool> = triangles
            .iter()
            .map(|t| t.circle.is_some_and(|c| c.strictly_contains(p.coord)))
            .collect();

        // Cavity boundary: edges belonging to exactly one bad triangle
        let mut edge_uses: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for t in triangles.iter().zip(&bad).filter(|(_, b)| **b).map(|(t, _)| t) {
            let [a, b, c] = t.vertices;
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let uses = edge_uses.entry((u.min(v), u.max(v))).or_insert(0);
                if *uses == 0 {
                    edges.push((u, v));
                }
                *uses += 1;
            }
        }

        let mut flags = bad.iter();
        triangles.retain(|_| !flags.next().copied().unwrap_or(false));

        for (u, v) in edges {
            if edge_uses.get(&(u.min(v), u.max(v))) == Some(&1) {
                triangles.push(Working::new([u, v, i], &coords));
            }
        }
    }

    triangles
        .into_iter()
        .filter(|t| t.circle.is_some() && t.vertices.iter().all(|&v| v < n))
        .map(|t| Triangle { vertices: t.vertices })
        .collect()
}

/// Connects the unique edges of a Delaunay triangulation of the sampled
/// particles, gated like distance mode.
#[derive(Debug, Clone, Copy)]
pub struct DelaunayLines {
    pub max_points: usize,
}

impl Default for DelaunayLines {
    fn default() -> Self {
        Self { max_points: MAX_TRIANGULATION_POINTS }
    }
}

impl LineAlgorithm for DelaunayLines {
    fn connect(&self, candidates: &LineCandidates<'_>, sink: &mut EdgeSink<'_>) {
        if candidates.settings.max_range_distance().is_none() {
            warn!("delaunay lines requested without an enabled range");
            return;
        }

        let points: Vec<Point2D> = candidates
            .indices
            .iter()
            .take(self.max_points)
            .map(|&i| {
                let [x, y, _] = candidates.field.position(i);
                Point2D::new(x as f64, y as f64, i)
            })
            .collect();
        let triangles = triangulate(&points);
        debug!(points = points.len(), triangles = triangles.len(), "triangulated");

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for (u, v) in triangles.iter().flat_map(Triangle::edges) {
            if sink.is_full() {
                break;
            }
            let (a, b) = (points[u].particle, points[v].particle);
            if !seen.insert((a.min(b), a.max(b))) {
                continue;
            }
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
