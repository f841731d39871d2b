use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::{ChannelMask, Texel};
use crate::geometry::field::PointField;
use crate::memory::buffer::PixelBuffer;
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::{MaskKernel, map_masked};

/// Highest nearest-point order the cellular op can select.
pub const MAX_OCTAVE: u8 = 4;

/// Distance to intensity: `min(dist / range, 1)` in texels.
///
/// A positive `range` is a fraction of the texture's shorter edge; a negative one is an
/// absolute texel distance.
#[derive(Clone, Copy, Debug)]
struct FieldScale {
    range: f64,
    texels: [f64; 2],
}

impl FieldScale {
    fn new(dst: &PixelBuffer, range: f32) -> TexResult<Self> {
        if range == 0.0 || !range.is_finite() {
            return Err(TexError::validation(format!(
                "field range must be finite and non-zero, got {range}"
            )));
        }
        let (w, h) = (f64::from(dst.width()), f64::from(dst.height()));
        let range = f64::from(range);
        Ok(Self {
            range: if range > 0.0 { range * w.min(h) } else { -range },
            texels: [w, h],
        })
    }

    fn apply(self, dist: f64) -> f32 {
        (dist / self.range).min(1.0) as f32
    }
}

fn texel_center(idx: usize, w: usize, h: usize) -> [f64; 2] {
    let (x, y) = (idx % w, idx / w);
    [(x as f64 + 0.5) / w as f64, (y as f64 + 0.5) / h as f64]
}

struct Cellular<'a> {
    field: &'a dyn PointField,
    octaves: [u8; 4],
    scale: FieldScale,
    width: usize,
    height: usize,
}

impl MaskKernel for Cellular<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        let mut dists = [0f64; MAX_OCTAVE as usize];
        for (i, t) in dst.iter_mut().enumerate() {
            let p = texel_center(start + i, self.width, self.height);
            self.field.nearest_distances(p, self.scale.texels, &mut dists);
            map_masked::<M>(t, |c, _| {
                let k = usize::from(self.octaves[c]);
                self.scale.apply(dists[k - 1])
            });
        }
    }
}

/// Per channel, write the scaled distance to the `octaves[c]`-th nearest point
/// (`0` leaves the channel untouched).
pub fn cellular(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    field: &dyn PointField,
    octaves: [u8; 4],
    range: f32,
) -> TexResult<()> {
    if let Some(o) = octaves.iter().find(|o| **o > MAX_OCTAVE) {
        return Err(TexError::validation(format!(
            "cellular octave {o} exceeds {MAX_OCTAVE}"
        )));
    }
    let bits = octaves
        .iter()
        .enumerate()
        .filter(|(_, o)| **o > 0)
        .fold(0u32, |acc, (c, _)| acc | (1 << c));
    let mask = ChannelMask::new(bits)?;
    let k = Cellular {
        field,
        octaves,
        scale: FieldScale::new(dst, range)?,
        width: dst.width() as usize,
        height: dst.height() as usize,
    };
    d.masked(mask, dst.texels_mut(), &k)
}

#[derive(Clone, Copy)]
enum EdgeSet {
    Delaunay,
    Voronoi,
}

struct EdgeDistance<'a> {
    field: &'a dyn PointField,
    edges: EdgeSet,
    scale: FieldScale,
    width: usize,
    height: usize,
}

impl MaskKernel for EdgeDistance<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        for (i, t) in dst.iter_mut().enumerate() {
            let p = texel_center(start + i, self.width, self.height);
            let dist = match self.edges {
                EdgeSet::Delaunay => self.field.delaunay_distance(p, self.scale.texels),
                EdgeSet::Voronoi => self.field.voronoi_distance(p, self.scale.texels),
            };
            let v = self.scale.apply(dist);
            map_masked::<M>(t, |_, _| v);
        }
    }
}

fn edge_field(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    field: &dyn PointField,
    edges: EdgeSet,
    range: f32,
    mask: ChannelMask,
) -> TexResult<()> {
    let k = EdgeDistance {
        field,
        edges,
        scale: FieldScale::new(dst, range)?,
        width: dst.width() as usize,
        height: dst.height() as usize,
    };
    d.masked(mask, dst.texels_mut(), &k)
}

/// Scaled distance to the nearest Delaunay edge.
pub fn delaunay(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    field: &dyn PointField,
    range: f32,
    mask: ChannelMask,
) -> TexResult<()> {
    edge_field(d, dst, field, EdgeSet::Delaunay, range, mask)
}

/// Scaled distance to the nearest Voronoi edge.
pub fn voronoi(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    field: &dyn PointField,
    range: f32,
    mask: ChannelMask,
) -> TexResult<()> {
    edge_field(d, dst, field, EdgeSet::Voronoi, range, mask)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/cellular.rs"]
mod tests;
