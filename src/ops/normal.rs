use crate::foundation::error::TexResult;
use crate::foundation::texel::Texel;
use crate::memory::buffer::PixelBuffer;
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::store;

const RGB: u8 = 0b0111;

/// Turn the alpha channel, read as a height field, into a tangent-space normal map in R, G, B.
///
/// Slopes are `h[x - 1] - h[x + 1]` (and likewise along y) with wraparound, scaled by `mult`,
/// so the normal `(dx, dy, 1)` leans downhill. It is normalized and remapped from `[-1, 1]` to
/// `[0, 1]`. Alpha is left untouched.
pub fn normal_map(d: &Dispatcher, dst: &mut PixelBuffer, mult: f32) -> TexResult<()> {
    let (w, h) = (dst.width() as usize, dst.height() as usize);
    let height: Vec<f32> = dst.texels().iter().map(|t| t.0[3]).collect();
    let at = |x: usize, y: usize| height[x + y * w];

    d.for_each_span(dst.texels_mut(), |start, span| {
        for (i, t) in span.iter_mut().enumerate() {
            let idx = start + i;
            let (x, y) = (idx % w, idx / w);
            let dx = (at((x + w - 1) % w, y) - at((x + 1) % w, y)) * mult;
            let dy = (at(x, (y + h - 1) % h) - at(x, (y + 1) % h)) * mult;
            let len = (dx * dx + dy * dy + 1.0).sqrt();
            let n = Texel::new(dx / len, dy / len, 1.0 / len, 0.0);
            store::<RGB>(t, (n + Texel::splat(1.0)) * 0.5);
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/ops/normal.rs"]
mod tests;
