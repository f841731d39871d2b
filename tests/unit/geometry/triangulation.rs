use super::*;

fn square() -> Vec<Point> {
    vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.4]]
}

#[test]
fn segment_distance_projects_and_clamps() {
    let s = Segment {
        a: [0.0, 0.0],
        b: [2.0, 0.0],
    };
    assert_eq!(s.distance_to([1.0, 0.5]), 0.5);
    assert_eq!(s.distance_to([3.0, 0.0]), 1.0);
    let p = Segment {
        a: [1.0, 1.0],
        b: [1.0, 1.0],
    };
    assert_eq!(p.distance_to([1.0, 3.0]), 2.0);
}

#[test]
fn too_few_distinct_points_fail() {
    assert!(Triangulation::new(&[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).is_err());
    assert!(Triangulation::new(&[[0.0, 0.0], [1.0, f64::NAN], [0.5, 0.5]]).is_err());
}

#[test]
fn duplicates_are_skipped() {
    let mut pts = square();
    pts.push([1.0, 0.0]);
    let t = Triangulation::new(&pts).unwrap();
    assert_eq!(t.points().len(), 5);
}

#[test]
fn square_with_centre_point_gives_four_triangles() {
    let t = Triangulation::new(&square()).unwrap();
    assert_eq!(t.triangles().count(), 4);
    // Four hull edges plus four spokes.
    assert_eq!(t.delaunay_edges().len(), 8);
    // Every spoke is shared by two triangles.
    assert_eq!(t.voronoi_edges().len(), 4);
    for tri in t.triangles() {
        assert!(tri.contains(&4));
    }
}

#[test]
fn delaunay_property_holds() {
    let pts: Vec<Point> = (0..40)
        .map(|i| {
            let f = i as f64;
            [(f * 0.618_034).fract(), (f * 0.414_214 + 0.1).fract()]
        })
        .collect();
    let t = Triangulation::new(&pts).unwrap();
    let p = t.points();
    for [a, b, c] in t.triangles() {
        let (center, r2) = circumcircle(p[a], p[b], p[c]);
        for (i, q) in p.iter().enumerate() {
            if i == a || i == b || i == c {
                continue;
            }
            let (dx, dy) = (q[0] - center[0], q[1] - center[1]);
            assert!(dx * dx + dy * dy >= r2 - 1e-9);
        }
    }
}

#[test]
fn delaunay_edges_are_sorted_and_unique() {
    let t = Triangulation::new(&square()).unwrap();
    let edges = t.delaunay_edges();
    for (i, e) in edges.iter().enumerate() {
        for f in &edges[i + 1..] {
            assert_ne!(e, f);
        }
    }
}
