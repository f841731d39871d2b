use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TexError, TexResult};
use crate::random::device::RandomDevice;

/// Points in the unit square, treated as one tile of a periodic plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    points: Vec<[f64; 2]>,
}

impl PointSet {
    /// Wrap explicit points; every coordinate must lie in `[0, 1]`.
    pub fn new(points: Vec<[f64; 2]>) -> TexResult<Self> {
        if points.is_empty() {
            return Err(TexError::validation("point set is empty"));
        }
        if let Some(p) = points
            .iter()
            .find(|p| !p.iter().all(|v| (0.0..=1.0).contains(v)))
        {
            return Err(TexError::validation(format!(
                "point ({}, {}) lies outside the unit square",
                p[0], p[1]
            )));
        }
        Ok(Self { points })
    }

    /// `count` distinct uniform points drawn from `dev`.
    pub fn make(dev: &mut RandomDevice, count: usize) -> TexResult<Self> {
        if count == 0 {
            return Err(TexError::validation("point set needs at least one point"));
        }
        let mut seen = HashSet::with_capacity(count);
        let mut points = Vec::with_capacity(count);
        let mut draws = 0usize;
        while points.len() < count {
            if draws > count.saturating_mul(8) {
                return Err(TexError::validation(format!(
                    "could not draw {count} distinct points"
                )));
            }
            draws += 1;
            let p = [f64::from(dev.next_unit()), f64::from(dev.next_unit())];
            if seen.insert((p[0].to_bits(), p[1].to_bits())) {
                points.push(p);
            }
        }
        Ok(Self { points })
    }

    /// Push points apart on the torus for `iterations` rounds.
    ///
    /// Each point is repelled by neighbours closer than the mean spacing `1 / sqrt(n)`, with a
    /// force falling linearly to zero at that distance. `strength` scales the step (0..=1).
    pub fn spread(&mut self, iterations: u32, strength: f64) -> TexResult<()> {
        if !(0.0..=1.0).contains(&strength) {
            return Err(TexError::validation(format!(
                "spread strength {strength} outside [0, 1]"
            )));
        }
        let n = self.points.len();
        if n < 2 {
            return Ok(());
        }
        let radius = 1.0 / (n as f64).sqrt();
        let mut moves = vec![[0.0f64; 2]; n];
        for _ in 0..iterations {
            for (i, m) in moves.iter_mut().enumerate() {
                *m = [0.0, 0.0];
                let p = self.points[i];
                for (j, q) in self.points.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let dx = torus_delta(p[0] - q[0]);
                    let dy = torus_delta(p[1] - q[1]);
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist >= radius || dist == 0.0 {
                        continue;
                    }
                    let push = (radius - dist) / radius * 0.5 * radius * strength;
                    m[0] += dx / dist * push;
                    m[1] += dy / dist * push;
                }
            }
            for (p, m) in self.points.iter_mut().zip(&moves) {
                p[0] = (p[0] + m[0]).rem_euclid(1.0);
                p[1] = (p[1] + m[1]).rem_euclid(1.0);
            }
        }
        Ok(())
    }

    /// The points.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Number of points in one tile.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false` for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Shortest signed offset on the unit torus.
pub fn torus_delta(d: f64) -> f64 {
    d - d.round()
}

#[cfg(test)]
#[path = "../../tests/unit/random/point_set.rs"]
mod tests;
