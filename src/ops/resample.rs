use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::{ChannelMask, Texel};
use crate::memory::bucket::magnitude;
use crate::memory::buffer::PixelBuffer;
use crate::ops::ensure_same_size;
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::{MaskKernel, store};

/// Sub-texel precision of [`sample_bilinear`]: 1/64 of a texel.
pub const SAMPLE_FRACTION_BITS: u32 = 6;
const SAMPLE_ONE: f32 = (1 << SAMPLE_FRACTION_BITS) as f32;
const SAMPLE_FRACTION_MASK: i64 = (1 << SAMPLE_FRACTION_BITS) - 1;

/// Bilinear read at texel coordinates `(x, y)`, quantized to 1/64 texel, tiling at the borders.
pub fn sample_bilinear(src: &PixelBuffer, x: f32, y: f32) -> Texel {
    let fx = (x * SAMPLE_ONE).floor() as i64;
    let fy = (y * SAMPLE_ONE).floor() as i64;
    let (ix, iy) = (fx >> SAMPLE_FRACTION_BITS, fy >> SAMPLE_FRACTION_BITS);
    let tx = (fx & SAMPLE_FRACTION_MASK) as f32 / SAMPLE_ONE;
    let ty = (fy & SAMPLE_FRACTION_MASK) as f32 / SAMPLE_ONE;

    let top = src.get_wrapped(ix, iy).lerp(src.get_wrapped(ix + 1, iy), tx);
    let bottom = src
        .get_wrapped(ix, iy + 1)
        .lerp(src.get_wrapped(ix + 1, iy + 1), tx);
    top.lerp(bottom, ty)
}

/// Signed number of doubling steps from `from` to `to`.
fn doubling_steps(from: u32, to: u32) -> TexResult<i32> {
    let (hi, lo) = if to >= from { (to, from) } else { (from, to) };
    if hi % lo != 0 || !(hi / lo).is_power_of_two() {
        return Err(TexError::validation(format!(
            "cannot resample {from} to {to}: ratio is not a power of two"
        )));
    }
    let steps = (hi / lo).trailing_zeros() as i32;
    Ok(if to >= from { steps } else { -steps })
}

/// Resample `src` to `width x height` by repeated doubling or halving of each axis.
///
/// Doubling inserts the mean of neighbouring columns (rows), wrapping from the last back to the
/// first; halving averages pairs. Only power-of-two ratios are supported.
pub fn resize(d: &Dispatcher, src: &PixelBuffer, width: u32, height: u32) -> TexResult<PixelBuffer> {
    magnitude(width, height)?;
    let sx = doubling_steps(src.width(), width)?;
    let sy = doubling_steps(src.height(), height)?;

    let mut cur: Option<PixelBuffer> = None;
    for _ in 0..sx.unsigned_abs() {
        let from = cur.as_ref().unwrap_or(src);
        let next = if sx > 0 {
            double_columns(d, from)?
        } else {
            halve_columns(d, from)?
        };
        tracing::debug!(from = from.width(), to = next.width(), "resize columns");
        cur = Some(next);
    }
    for _ in 0..sy.unsigned_abs() {
        let from = cur.as_ref().unwrap_or(src);
        let next = if sy > 0 {
            double_rows(d, from)?
        } else {
            halve_rows(d, from)?
        };
        tracing::debug!(from = from.height(), to = next.height(), "resize rows");
        cur = Some(next);
    }
    match cur {
        Some(buf) => Ok(buf),
        None => src.duplicate(),
    }
}

fn double_columns(d: &Dispatcher, src: &PixelBuffer) -> TexResult<PixelBuffer> {
    let w = src.width() as usize;
    let mut out = src.sibling(src.width() * 2, src.height())?;
    let input = src.texels();
    d.for_each_chunked(out.texels_mut(), w * 2, |row0, span| {
        for (r, row) in span.chunks_exact_mut(w * 2).enumerate() {
            let line = &input[(row0 + r) * w..(row0 + r + 1) * w];
            for x in 0..w {
                row[2 * x] = line[x];
                row[2 * x + 1] = line[x].lerp(line[(x + 1) % w], 0.5);
            }
        }
        Ok(())
    })?;
    Ok(out)
}

fn halve_columns(d: &Dispatcher, src: &PixelBuffer) -> TexResult<PixelBuffer> {
    let w = src.width() as usize;
    let half = w / 2;
    let mut out = src.sibling(src.width() / 2, src.height())?;
    let input = src.texels();
    d.for_each_chunked(out.texels_mut(), half, |row0, span| {
        for (r, row) in span.chunks_exact_mut(half).enumerate() {
            let line = &input[(row0 + r) * w..(row0 + r + 1) * w];
            for (x, t) in row.iter_mut().enumerate() {
                *t = line[2 * x].lerp(line[2 * x + 1], 0.5);
            }
        }
        Ok(())
    })?;
    Ok(out)
}

fn double_rows(d: &Dispatcher, src: &PixelBuffer) -> TexResult<PixelBuffer> {
    let w = src.width() as usize;
    let h = src.height() as usize;
    let mut out = src.sibling(src.width(), src.height() * 2)?;
    let input = src.texels();
    let line = |y: usize| &input[y * w..(y + 1) * w];
    d.for_each_chunked(out.texels_mut(), w, |row0, span| {
        for (r, row) in span.chunks_exact_mut(w).enumerate() {
            let oy = row0 + r;
            let a = line(oy / 2);
            if oy % 2 == 0 {
                row.copy_from_slice(a);
            } else {
                let b = line((oy / 2 + 1) % h);
                for (t, (pa, pb)) in row.iter_mut().zip(a.iter().zip(b)) {
                    *t = pa.lerp(*pb, 0.5);
                }
            }
        }
        Ok(())
    })?;
    Ok(out)
}

fn halve_rows(d: &Dispatcher, src: &PixelBuffer) -> TexResult<PixelBuffer> {
    let w = src.width() as usize;
    let mut out = src.sibling(src.width(), src.height() / 2)?;
    let input = src.texels();
    d.for_each_chunked(out.texels_mut(), w, |row0, span| {
        for (r, row) in span.chunks_exact_mut(w).enumerate() {
            let y = 2 * (row0 + r);
            let a = &input[y * w..(y + 1) * w];
            let b = &input[(y + 1) * w..(y + 2) * w];
            for (t, (pa, pb)) in row.iter_mut().zip(a.iter().zip(b)) {
                *t = pa.lerp(*pb, 0.5);
            }
        }
        Ok(())
    })?;
    Ok(out)
}

struct Warp<'a> {
    src: &'a PixelBuffer,
    map: &'a [Texel],
    mult: f32,
}

impl MaskKernel for Warp<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        let w = self.src.width() as usize;
        for (i, t) in dst.iter_mut().enumerate() {
            let idx = start + i;
            let (x, y) = ((idx % w) as f32, (idx / w) as f32);
            let m = self.map[idx];
            let v = sample_bilinear(self.src, x + m.0[0] * self.mult, y + m.0[1] * self.mult);
            store::<M>(t, v);
        }
    }
}

/// Displace `src` by the red/green channels of `map` scaled by `mult`, in texels.
/// Unmasked channels keep `src`'s values.
pub fn warp(
    d: &Dispatcher,
    src: &PixelBuffer,
    map: &PixelBuffer,
    mult: f32,
    mask: ChannelMask,
) -> TexResult<PixelBuffer> {
    ensure_same_size(src, map, "warp")?;
    let mut out = src.duplicate()?;
    let k = Warp {
        src,
        map: map.texels(),
        mult,
    };
    d.masked(mask, out.texels_mut(), &k)?;
    Ok(out)
}

struct Lens<'a> {
    src: &'a PixelBuffer,
}

impl MaskKernel for Lens<'_> {
    fn apply<const M: u8>(&self, _start: usize, dst: &mut [Texel]) {
        let (wf, hf) = (self.src.width() as f32, self.src.height() as f32);
        for t in dst {
            let (u, v) = (t.0[0].clamp(0.0, 1.0), t.0[1].clamp(0.0, 1.0));
            let v = sample_bilinear(self.src, u * wf, v * hf);
            store::<M>(t, v);
        }
    }
}

/// Replace each texel of `map` with `src` sampled at the normalized coordinates held in the
/// texel's red and green channels, each clamped to `[0, 1]`. `src` may have any size.
pub fn sample_map(
    d: &Dispatcher,
    map: &mut PixelBuffer,
    src: &PixelBuffer,
    mask: ChannelMask,
) -> TexResult<()> {
    d.masked(mask, map.texels_mut(), &Lens { src })
}

struct Shift<'a> {
    src: &'a PixelBuffer,
    dx: i64,
    dy: i64,
}

impl MaskKernel for Shift<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        let w = self.src.width() as usize;
        for (i, t) in dst.iter_mut().enumerate() {
            let idx = start + i;
            let (x, y) = ((idx % w) as i64, (idx / w) as i64);
            store::<M>(t, self.src.get_wrapped(x + self.dx, y + self.dy));
        }
    }
}

/// Read `src` offset by `(trunc(x_shift * width), trunc(y_shift * height))` texels with
/// wraparound: `out(x, y) = src(x + dx, y + dy)`.
pub fn shift(
    d: &Dispatcher,
    src: &PixelBuffer,
    x_shift: f32,
    y_shift: f32,
    mask: ChannelMask,
) -> TexResult<PixelBuffer> {
    let dx = (x_shift * src.width() as f32) as i64;
    let dy = (y_shift * src.height() as f32) as i64;
    let mut out = src.duplicate()?;
    d.masked(mask, out.texels_mut(), &Shift { src, dx, dy })?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/resample.rs"]
mod tests;
