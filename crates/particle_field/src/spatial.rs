use std::collections::HashMap;

/// Smallest cell edge; zero-width ranges still get a usable grid.
const MIN_CELL_SIZE: f32 = 1e-3;

type Cell = (i32, i32, i32);

/// Uniform 3D hash grid over a slice of points.
///
/// Stores point slots (indices into the slice it was built from) so callers
/// can map back to their own ordering.
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<Cell, Vec<usize>>,
    /// Lowest and highest occupied cell coordinate on each axis
    bounds: Option<(Cell, Cell)>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() { cell_size.max(MIN_CELL_SIZE) } else { f32::MAX };
        Self { cell_size, cells: HashMap::new(), bounds: None }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid with `points[slot]` inserted under `slot`.
    pub fn from_points(points: &[[f32; 3]], cell_size: f32) -> Self {
        let mut grid = Self::new(cell_size);
        for (slot, &p) in points.iter().enumerate() {
            grid.insert(p, slot);
        }
        grid
    }

    pub fn insert(&mut self, position: [f32; 3], slot: usize) {
        let cell = self.cell_of(position);
        self.bounds = Some(match self.bounds {
            None => (cell, cell),
            Some((lo, hi)) => (
                (lo.0.min(cell.0), lo.1.min(cell.1), lo.2.min(cell.2)),
                (hi.0.max(cell.0), hi.1.max(cell.1), hi.2.max(cell.2)),
            ),
        });
        self.cells.entry(cell).or_default().push(slot);
    }

    /// Slots in the 27 cells around `position`: a superset of every point
    /// within one `cell_size` of it.
    pub fn neighbors(&self, position: [f32; 3]) -> Vec<usize> {
        let (cx, cy, cz) = self.cell_of(position);
        let mut found = Vec::new();
        for dx in -1..=1i32 {
            for dy in -1..=1i32 {
                for dz in -1..=1i32 {
                    let cell = (cx.wrapping_add(dx), cy.wrapping_add(dy), cz.wrapping_add(dz));
                    if let Some(slots) = self.cells.get(&cell) {
                        found.extend_from_slice(slots);
                    }
                }
            }
        }
        found
    }

    /// Slots in the cells exactly `radius` cells (Chebyshev) away from the
    /// cell of `position`.
    ///
    /// Rings `0..=r` together hold every point within `r * cell_size` of
    /// `position`.
    pub fn ring(&self, position: [f32; 3], radius: u32) -> Vec<usize> {
        let mut found = Vec::new();
        let Some((lo, hi)) = self.bounds else {
            return found;
        };

        let (cx, cy, cz) = self.cell_of(position);
        let (cx, cy, cz) = (cx as i64, cy as i64, cz as i64);
        let r = radius as i64;
        let span = |c: i64, lo: i32, hi: i32| ((c - r).max(lo as i64), (c + r).min(hi as i64));
        let (x0, x1) = span(cx, lo.0, hi.0);
        let (y0, y1) = span(cy, lo.1, hi.1);
        let (z0, z1) = span(cz, lo.2, hi.2);

        let mut visit = |x: i64, y: i64, z: i64| {
            if let Some(slots) = self.cells.get(&(x as i32, y as i32, z as i32)) {
                found.extend_from_slice(slots);
            }
        };

        for x in x0..=x1 {
            for y in y0..=y1 {
                if (x - cx).abs() == r || (y - cy).abs() == r {
                    for z in z0..=z1 {
                        visit(x, y, z);
                    }
                } else {
                    // Inside the shell on x and y: only the two z faces
                    for z in [cz - r, cz + r] {
                        if (z0..=z1).contains(&z) {
                            visit(x, y, z);
                        }
                    }
                }
            }
        }
        found
    }

    /// Smallest ring radius around `position` that reaches every occupied cell.
    pub fn covering_radius(&self, position: [f32; 3]) -> u32 {
        let Some((lo, hi)) = self.bounds else {
            return 0;
        };
        let (cx, cy, cz) = self.cell_of(position);
        let reach = |c: i32, lo: i32, hi: i32| {
            let (c, lo, hi) = (c as i64, lo as i64, hi as i64);
            (c - lo).abs().max((hi - c).abs())
        };
        let widest = reach(cx, lo.0, hi.0).max(reach(cy, lo.1, hi.1)).max(reach(cz, lo.2, hi.2));
        u32::try_from(widest).unwrap_or(u32::MAX)
    }

    fn cell_of(&self, [x, y, z]: [f32; 3]) -> Cell {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }
}
