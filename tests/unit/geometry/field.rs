use super::*;
use crate::random::device::RandomDevice;

const UNIT: Point = [1.0, 1.0];

fn brute_nearest(set: &PointSet, p: Point, scale: Point, k: usize) -> Vec<f64> {
    let q = to_central_tile(p);
    let mut all: Vec<f64> = TILE_OFFSETS
        .iter()
        .flat_map(|o| set.points().iter().map(move |s| [s[0] + o[0], s[1] + o[1]]))
        .map(|r| scaled_distance(r, q, scale))
        .collect();
    all.sort_by(f64::total_cmp);
    all.truncate(k);
    all
}

#[test]
fn central_tile_mapping() {
    assert_eq!(to_central_tile([0.75, 0.5]), [0.75, 0.5]);
    assert_eq!(to_central_tile([0.25, 0.0]), [1.25, 1.0]);
}

#[test]
fn nearest_distances_wrap_around_the_tile() {
    let set = PointSet::new(vec![[0.1, 0.1], [0.6, 0.6]]).unwrap();
    let field = DelaunayField::new(&set).unwrap();
    assert_eq!(field.point_count(), 2);

    let mut out = [0f64; 2];
    // (0.95, 0.1) is 0.15 from (0.1, 0.1) across the right edge.
    field.nearest_distances([0.95, 0.1], UNIT, &mut out);
    assert!((out[0] - 0.15).abs() < 1e-9);
    assert!(out[0] <= out[1]);
}

#[test]
fn scale_measures_each_axis_in_texels() {
    let set = PointSet::new(vec![[0.1, 0.1], [0.6, 0.6]]).unwrap();
    let field = DelaunayField::new(&set).unwrap();
    let mut out = [0f64; 1];
    field.nearest_distances([0.95, 0.1], [64.0, 16.0], &mut out);
    assert!((out[0] - 0.15 * 64.0).abs() < 1e-9);
    field.nearest_distances([0.1, 0.25], [64.0, 16.0], &mut out);
    assert!((out[0] - 0.15 * 16.0).abs() < 1e-9);
}

#[test]
fn grid_lookup_matches_exhaustive_scan() {
    let set = PointSet::make(&mut RandomDevice::seeded(5), 40).unwrap();
    let field = DelaunayField::new(&set).unwrap();
    let mut out = [0f64; 4];
    for j in 0..50 {
        let p = [(j as f64 * 0.137).fract(), (j as f64 * 0.291).fract()];
        for scale in [UNIT, [32.0, 128.0]] {
            field.nearest_distances(p, scale, &mut out);
            let want = brute_nearest(&set, p, scale, 4);
            for (a, b) in out.iter().zip(&want) {
                assert!((a - b).abs() < 1e-9);
            }
            let q = to_central_tile(p);
            let d = field.delaunay_distance(p, scale);
            assert!((d - nearest_segment(q, scale, field.delaunay_edges())).abs() < 1e-9);
            let v = field.voronoi_distance(p, scale);
            assert!((v - nearest_segment(q, scale, field.voronoi_edges())).abs() < 1e-9);
        }
    }
}

#[test]
fn point_on_an_edge_has_zero_edge_distance() {
    let set = PointSet::new(vec![[0.2, 0.3], [0.7, 0.1], [0.5, 0.8], [0.9, 0.6]]).unwrap();
    let field = DelaunayField::new(&set).unwrap();
    assert!(!field.delaunay_edges().is_empty());
    assert!(!field.voronoi_edges().is_empty());
    // Every input point is a Delaunay vertex.
    assert!(field.delaunay_distance([0.5, 0.8], UNIT) < 1e-9);
}
