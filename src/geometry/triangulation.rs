use std::collections::HashMap;

use crate::foundation::error::{TexError, TexResult};

/// A point in texture space.
pub type Point = [f64; 2];

/// Line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub a: Point,
    /// Second endpoint.
    pub b: Point,
}

impl Segment {
    /// Euclidean distance from `p` to the closest point of the segment.
    pub fn distance_to(&self, p: Point) -> f64 {
        let (vx, vy) = (self.b[0] - self.a[0], self.b[1] - self.a[1]);
        let (wx, wy) = (p[0] - self.a[0], p[1] - self.a[1]);
        let len2 = vx * vx + vy * vy;
        let t = if len2 > 0.0 {
            ((wx * vx + wy * vy) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (dx, dy) = (wx - t * vx, wy - t * vy);
        (dx * dx + dy * dy).sqrt()
    }

    /// The segment with both axes stretched by `scale`.
    pub fn scaled(&self, scale: Point) -> Self {
        Self {
            a: [self.a[0] * scale[0], self.a[1] * scale[1]],
            b: [self.b[0] * scale[0], self.b[1] * scale[1]],
        }
    }

    /// Corners of the axis-aligned bounding box.
    pub fn bounds(&self) -> (Point, Point) {
        (
            [self.a[0].min(self.b[0]), self.a[1].min(self.b[1])],
            [self.a[0].max(self.b[0]), self.a[1].max(self.b[1])],
        )
    }
}

#[derive(Clone, Copy, Debug)]
struct Triangle {
    v: [usize; 3],
    center: Point,
    radius2: f64,
}

impl Triangle {
    fn new(pts: &[Point], v: [usize; 3]) -> Self {
        let (center, radius2) = circumcircle(pts[v[0]], pts[v[1]], pts[v[2]]);
        Self { v, center, radius2 }
    }

    fn encloses(&self, p: Point) -> bool {
        let (dx, dy) = (p[0] - self.center[0], p[1] - self.center[1]);
        dx * dx + dy * dy < self.radius2
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.v;
        [edge_key(a, b), edge_key(b, c), edge_key(c, a)]
    }
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

fn circumcircle(a: Point, b: Point, c: Point) -> (Point, f64) {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < f64::EPSILON {
        let center = [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0];
        return (center, f64::INFINITY);
    }
    let (a2, b2, c2) = (
        a[0] * a[0] + a[1] * a[1],
        b[0] * b[0] + b[1] * b[1],
        c[0] * c[0] + c[1] * c[1],
    );
    let ux = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let uy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    let (dx, dy) = (a[0] - ux, a[1] - uy);
    ([ux, uy], dx * dx + dy * dy)
}

/// Delaunay triangulation built incrementally (Bowyer-Watson).
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<Point>,
    triangles: Vec<Triangle>,
}

impl Triangulation {
    /// Triangulate `points`. Exact duplicates are skipped.
    pub fn new(points: &[Point]) -> TexResult<Self> {
        let mut pts: Vec<Point> = Vec::with_capacity(points.len() + 3);
        for p in points {
            if !p.iter().all(|v| v.is_finite()) {
                return Err(TexError::validation("triangulation point is not finite"));
            }
            if !pts.contains(p) {
                pts.push(*p);
            }
        }
        if pts.len() < 3 {
            return Err(TexError::validation(format!(
                "triangulation needs 3 distinct points, got {}",
                pts.len()
            )));
        }

        let n = pts.len();
        let (mut lo, mut hi) = ([f64::MAX; 2], [f64::MIN; 2]);
        for p in &pts {
            for a in 0..2 {
                lo[a] = lo[a].min(p[a]);
                hi[a] = hi[a].max(p[a]);
            }
        }
        let span = (hi[0] - lo[0]).max(hi[1] - lo[1]).max(1.0) * 20.0;
        let mid = [(lo[0] + hi[0]) * 0.5, (lo[1] + hi[1]) * 0.5];
        pts.push([mid[0] - span, mid[1] - span]);
        pts.push([mid[0] + span, mid[1] - span]);
        pts.push([mid[0], mid[1] + span]);

        let mut triangles = vec![Triangle::new(&pts, [n, n + 1, n + 2])];
        for i in 0..n {
            let p = pts[i];
            let mut boundary: HashMap<(usize, usize), u32> = HashMap::new();
            triangles.retain(|t| {
                if !t.encloses(p) {
                    return true;
                }
                for e in t.edges() {
                    *boundary.entry(e).or_default() += 1;
                }
                false
            });
            for ((a, b), count) in boundary {
                if count == 1 {
                    triangles.push(Triangle::new(&pts, [a, b, i]));
                }
            }
        }
        triangles.retain(|t| t.v.iter().all(|v| *v < n));
        pts.truncate(n);
        Ok(Self {
            points: pts,
            triangles,
        })
    }

    /// Distinct input points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Vertex indices of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.triangles.iter().map(|t| t.v)
    }

    fn adjacency(&self) -> HashMap<(usize, usize), Vec<usize>> {
        let mut adj: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (ti, t) in self.triangles.iter().enumerate() {
            for e in t.edges() {
                adj.entry(e).or_default().push(ti);
            }
        }
        adj
    }

    /// Every triangle edge once.
    pub fn delaunay_edges(&self) -> Vec<Segment> {
        let mut keys: Vec<(usize, usize)> = self.adjacency().into_keys().collect();
        keys.sort_unstable();
        keys.into_iter()
            .map(|(a, b)| Segment {
                a: self.points[a],
                b: self.points[b],
            })
            .collect()
    }

    /// Dual edges: circumcentre to circumcentre across every interior triangle edge.
    pub fn voronoi_edges(&self) -> Vec<Segment> {
        let mut shared: Vec<((usize, usize), Vec<usize>)> = self
            .adjacency()
            .into_iter()
            .filter(|(_, tris)| tris.len() == 2)
            .collect();
        shared.sort_unstable_by_key(|(k, _)| *k);
        shared
            .into_iter()
            .filter(|(_, tris)| {
                tris.iter()
                    .all(|t| self.triangles[*t].radius2.is_finite())
            })
            .map(|(_, tris)| Segment {
                a: self.triangles[tris[0]].center,
                b: self.triangles[tris[1]].center,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/triangulation.rs"]
mod tests;
