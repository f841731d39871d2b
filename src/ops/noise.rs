use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::{ChannelMask, Texel};
use crate::memory::buffer::PixelBuffer;
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::{MaskKernel, store};
use crate::random::device::RandomDevice;

struct Scatter<'a> {
    values: &'a [Texel],
}

impl MaskKernel for Scatter<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        for (t, v) in dst.iter_mut().zip(&self.values[start..]) {
            store::<M>(t, *v);
        }
    }
}

/// Fill each masked channel with its own draw from `dev`, normalized to `[0, 1]`.
///
/// Draws are taken texel by texel, channels in R, G, B, A order, so a seed reproduces the
/// same texture on any thread count.
pub fn noise(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    dev: &mut RandomDevice,
    mask: ChannelMask,
) -> TexResult<()> {
    if mask.is_empty() {
        return Ok(());
    }
    let values: Vec<Texel> = (0..dst.pixel_count())
        .map(|_| {
            let mut t = Texel::ZERO;
            for c in 0..4 {
                if mask.bits() & (1 << c) != 0 {
                    t.0[c] = dev.next_unit();
                }
            }
            t
        })
        .collect();
    d.masked(mask, dst.texels_mut(), &Scatter { values: &values })
}

/// One draw per texel, copied into every masked channel.
pub fn white_noise(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    dev: &mut RandomDevice,
    mask: ChannelMask,
) -> TexResult<()> {
    if mask.is_empty() {
        return Ok(());
    }
    let values: Vec<Texel> = (0..dst.pixel_count())
        .map(|_| Texel::splat(dev.next_unit()))
        .collect();
    d.masked(mask, dst.texels_mut(), &Scatter { values: &values })
}

/// Bilinear read of `src` magnified `2^level` times about the origin, tiling the magnified
/// region: texel `(x, y)` blends the four source texels around `(x, y) / 2^level`.
fn sample_boxed(src: &PixelBuffer, x: usize, y: usize, level: u32) -> Texel {
    let div = 1usize << level;
    let (sw, sh) = (src.width() as usize / div, src.height() as usize / div);
    let (bx, by) = (x / div, y / div);
    let (nx, ny) = ((bx + 1) % sw, (by + 1) % sh);
    let (fx, fy) = ((x % div) as f32, (y % div) as f32);
    let n = div as f32;
    let at = |x: usize, y: usize| src.get(x as u32, y as u32);
    let acc = at(bx, by) * ((n - fx) * (n - fy))
        + at(nx, by) * (fx * (n - fy))
        + at(bx, ny) * ((n - fx) * fy)
        + at(nx, ny) * (fx * fy);
    acc * (1.0 / (n * n))
}

struct Octaves<'a> {
    src: &'a PixelBuffer,
    weights: &'a [f32],
    total: f32,
}

impl MaskKernel for Octaves<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        let w = self.src.width() as usize;
        for (i, t) in dst.iter_mut().enumerate() {
            let idx = start + i;
            let (x, y) = (idx % w, idx / w);
            let mut acc = Texel::ZERO;
            for (l, wt) in self.weights.iter().enumerate() {
                acc += sample_boxed(self.src, x, y, l as u32) * *wt;
            }
            store::<M>(t, acc * (1.0 / self.total));
        }
    }
}

/// Weighted sum of `levels` magnified octaves of `src`, normalized by the total weight.
///
/// Octave `l` is [`sample_boxed`] at level `l`, weighted `persistence^l`. Unmasked channels keep
/// `src`'s values.
pub fn turbulence(
    d: &Dispatcher,
    src: &PixelBuffer,
    levels: u32,
    persistence: f32,
    mask: ChannelMask,
) -> TexResult<PixelBuffer> {
    let min_edge = src.width().min(src.height());
    if levels == 0 || levels > 32 || (1u64 << (levels - 1)) > u64::from(min_edge) {
        return Err(TexError::validation(format!(
            "turbulence levels {levels} out of range for a {}x{} texture",
            src.width(),
            src.height()
        )));
    }
    let weights: Vec<f32> = (0..levels as i32).map(|l| persistence.powi(l)).collect();
    let total: f32 = weights.iter().sum();
    if !total.is_finite() || total == 0.0 {
        return Err(TexError::validation(format!(
            "turbulence persistence {persistence} gives a degenerate weight sum"
        )));
    }

    let mut out = src.duplicate()?;
    let k = Octaves {
        src,
        weights: &weights,
        total,
    };
    d.masked(mask, out.texels_mut(), &k)?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/noise.rs"]
mod tests;
