//! Point-set geometry behind cellular synthesis.

/// Distance fields over tileable point sets.
pub mod field;
/// Uniform cell buckets for nearest-item queries.
pub mod grid;
/// Bowyer-Watson triangulation and its Voronoi dual.
pub mod triangulation;
