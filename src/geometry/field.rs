use crate::foundation::error::TexResult;
use crate::geometry::grid::CellGrid;
use crate::geometry::triangulation::{Point, Segment, Triangulation};
use crate::random::point_set::PointSet;

/// Offsets at which a tile of points is replicated so every query in the central tile sees its
/// neighbours across the wrap.
pub const TILE_OFFSETS: [Point; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

const POINTS_PER_CELL: usize = 2;
const SEGMENTS_PER_CELL: usize = 4;

/// Distance queries over a tileable point set.
///
/// Queries take points in the unit square; implementations account for wraparound. `scale`
/// stretches each axis before measuring (texels per unit), so a `w x h` texture passes
/// `[w, h]` and receives distances in texels.
pub trait PointField: Sync {
    /// Points in one tile.
    fn point_count(&self) -> usize;

    /// Fill `out` with the ascending distances from `p` to its `out.len()` nearest points.
    fn nearest_distances(&self, p: Point, scale: Point, out: &mut [f64]);

    /// Delaunay edges of the replicated set.
    fn delaunay_edges(&self) -> &[Segment];

    /// Voronoi edges of the replicated set.
    fn voronoi_edges(&self) -> &[Segment];

    /// Distance from `p` to the closest Delaunay edge.
    fn delaunay_distance(&self, p: Point, scale: Point) -> f64 {
        nearest_segment(to_central_tile(p), scale, self.delaunay_edges())
    }

    /// Distance from `p` to the closest Voronoi edge.
    fn voronoi_distance(&self, p: Point, scale: Point) -> f64 {
        nearest_segment(to_central_tile(p), scale, self.voronoi_edges())
    }
}

/// Closest of `edges` to `q` under `scale`, by exhaustive scan.
pub fn nearest_segment(q: Point, scale: Point, edges: &[Segment]) -> f64 {
    let sq = [q[0] * scale[0], q[1] * scale[1]];
    edges
        .iter()
        .map(|s| s.scaled(scale).distance_to(sq))
        .fold(f64::INFINITY, f64::min)
}

/// Move a unit-square point into `[0.5, 1.5)^2`, the region of the replicated set whose
/// neighbourhood is complete.
pub fn to_central_tile(p: Point) -> Point {
    [
        (p[0] - 0.5).rem_euclid(1.0) + 0.5,
        (p[1] - 0.5).rem_euclid(1.0) + 0.5,
    ]
}

fn scaled_distance(a: Point, b: Point, scale: Point) -> f64 {
    let (dx, dy) = ((a[0] - b[0]) * scale[0], (a[1] - b[1]) * scale[1]);
    (dx * dx + dy * dy).sqrt()
}

fn insert_sorted(out: &mut [f64], dist: f64) {
    if let Some(pos) = out.iter().position(|d| dist < *d) {
        out[pos..].rotate_right(1);
        out[pos] = dist;
    }
}

/// Segments bucketed by the cells they overlap.
#[derive(Debug, Clone)]
struct SegmentIndex {
    segments: Vec<Segment>,
    grid: CellGrid,
}

impl SegmentIndex {
    fn new(segments: Vec<Segment>) -> Self {
        let mut grid = CellGrid::new([0.0, 0.0], 2.0, segments.len(), SEGMENTS_PER_CELL);
        for (i, s) in segments.iter().enumerate() {
            let (lo, hi) = s.bounds();
            grid.insert_box(lo, hi, i as u32);
        }
        Self { segments, grid }
    }

    fn nearest(&self, q: Point, scale: Point) -> f64 {
        let sq = [q[0] * scale[0], q[1] * scale[1]];
        let min_scale = scale[0].min(scale[1]);
        let center = self.grid.cell_of(q);
        let mut best = f64::INFINITY;
        let mut ids = Vec::new();
        for r in 0.. {
            if self.grid.ring_lower_bound(r) * min_scale >= best {
                break;
            }
            ids.clear();
            if !self.grid.ring(center, r, &mut ids) {
                break;
            }
            for id in &ids {
                let d = self.segments[*id as usize].scaled(scale).distance_to(sq);
                best = best.min(d);
            }
        }
        best
    }
}

/// [`PointField`] backed by a Delaunay triangulation of the four-way replicated points.
///
/// Points and both edge sets are bucketed on a uniform grid over `[0, 2)^2`, so a query only
/// visits the cells around it.
#[derive(Debug, Clone)]
pub struct DelaunayField {
    count: usize,
    replicated: Vec<Point>,
    points: CellGrid,
    delaunay: SegmentIndex,
    voronoi: SegmentIndex,
}

impl DelaunayField {
    /// Replicate and triangulate `set`.
    pub fn new(set: &PointSet) -> TexResult<Self> {
        let replicated: Vec<Point> = TILE_OFFSETS
            .iter()
            .flat_map(|o| set.points().iter().map(move |p| [p[0] + o[0], p[1] + o[1]]))
            .collect();
        let tri = Triangulation::new(&replicated)?;
        let delaunay = SegmentIndex::new(tri.delaunay_edges());
        let voronoi = SegmentIndex::new(tri.voronoi_edges());

        let mut points = CellGrid::new([0.0, 0.0], 2.0, replicated.len(), POINTS_PER_CELL);
        for (i, p) in replicated.iter().enumerate() {
            points.insert_box(*p, *p, i as u32);
        }
        tracing::debug!(
            points = set.len(),
            delaunay = delaunay.segments.len(),
            voronoi = voronoi.segments.len(),
            grid = points.side(),
            "point field triangulated"
        );
        Ok(Self {
            count: set.len(),
            replicated,
            points,
            delaunay,
            voronoi,
        })
    }
}

impl PointField for DelaunayField {
    fn point_count(&self) -> usize {
        self.count
    }

    fn nearest_distances(&self, p: Point, scale: Point, out: &mut [f64]) {
        out.fill(f64::INFINITY);
        let Some(last) = out.len().checked_sub(1) else {
            return;
        };
        let q = to_central_tile(p);
        let min_scale = scale[0].min(scale[1]);
        let center = self.points.cell_of(q);
        let mut ids = Vec::new();
        for r in 0.. {
            if self.points.ring_lower_bound(r) * min_scale >= out[last] {
                break;
            }
            ids.clear();
            if !self.points.ring(center, r, &mut ids) {
                break;
            }
            for id in &ids {
                insert_sorted(out, scaled_distance(self.replicated[*id as usize], q, scale));
            }
        }
    }

    fn delaunay_edges(&self) -> &[Segment] {
        &self.delaunay.segments
    }

    fn voronoi_edges(&self) -> &[Segment] {
        &self.voronoi.segments
    }

    fn delaunay_distance(&self, p: Point, scale: Point) -> f64 {
        self.delaunay.nearest(to_central_tile(p), scale)
    }

    fn voronoi_distance(&self, p: Point, scale: Point) -> f64 {
        self.voronoi.nearest(to_central_tile(p), scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/field.rs"]
mod tests;
