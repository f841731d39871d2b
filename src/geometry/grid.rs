use crate::geometry::triangulation::Point;

/// Largest number of cells along one axis.
pub const MAX_GRID_SIDE: usize = 256;

/// Uniform bucket grid over a square region, holding item ids per cell.
///
/// Items are registered by bounding box. Lookups walk rings of cells outward from the query's
/// cell; nothing in ring `r` is closer than [`CellGrid::ring_lower_bound`].
#[derive(Debug, Clone)]
pub struct CellGrid {
    origin: Point,
    cell: f64,
    side: usize,
    cells: Vec<Vec<u32>>,
}

impl CellGrid {
    /// Grid over `[origin, origin + extent)^2` sized for about `per_cell` of `items` per cell.
    pub fn new(origin: Point, extent: f64, items: usize, per_cell: usize) -> Self {
        let target = (items / per_cell.max(1)).max(1) as f64;
        let side = (target.sqrt().ceil() as usize).clamp(1, MAX_GRID_SIDE);
        Self {
            origin,
            cell: extent / side as f64,
            side,
            cells: vec![Vec::new(); side * side],
        }
    }

    /// Cells along one axis.
    pub fn side(&self) -> usize {
        self.side
    }

    fn axis(&self, v: f64, c: usize) -> usize {
        let i = ((v - self.origin[c]) / self.cell).floor();
        if i <= 0.0 {
            0
        } else {
            (i as usize).min(self.side - 1)
        }
    }

    /// Cell holding `p`, clamped to the grid.
    pub fn cell_of(&self, p: Point) -> (usize, usize) {
        (self.axis(p[0], 0), self.axis(p[1], 1))
    }

    /// Register `id` in every cell overlapped by the box `[lo, hi]`.
    pub fn insert_box(&mut self, lo: Point, hi: Point, id: u32) {
        let (x0, y0) = self.cell_of(lo);
        let (x1, y1) = self.cell_of(hi);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.cells[x + y * self.side].push(id);
            }
        }
    }

    /// Unscaled distance below which no item first found in ring `r` can lie.
    pub fn ring_lower_bound(&self, r: usize) -> f64 {
        r.saturating_sub(1) as f64 * self.cell
    }

    /// Append the ids of every cell at Chebyshev distance `r` from `center`.
    /// Returns `false` once the ring lies entirely outside the grid.
    pub fn ring(&self, center: (usize, usize), r: usize, out: &mut Vec<u32>) -> bool {
        let (cx, cy) = (center.0 as isize, center.1 as isize);
        let r = r as isize;
        let side = self.side as isize;
        let mut any = false;
        for y in (cy - r)..=(cy + r) {
            if !(0..side).contains(&y) {
                continue;
            }
            let edge_row = y == cy - r || y == cy + r;
            let step = if edge_row || r == 0 { 1 } else { 2 * r };
            let mut x = cx - r;
            while x <= cx + r {
                if (0..side).contains(&x) {
                    any = true;
                    out.extend_from_slice(&self.cells[(x + y * side) as usize]);
                }
                x += step;
            }
        }
        any
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/grid.rs"]
mod tests;
