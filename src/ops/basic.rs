use crate::foundation::error::TexResult;
use crate::foundation::texel::{ChannelMask, Texel};
use crate::memory::buffer::PixelBuffer;
use crate::ops::ensure_same_size;
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::{MaskKernel, MaskPairKernel, has, store};

struct CopyMasked<'a> {
    src: &'a [Texel],
}

impl MaskKernel for CopyMasked<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        for (t, s) in dst.iter_mut().zip(&self.src[start..]) {
            store::<M>(t, *s);
        }
    }
}

struct Fill {
    color: Texel,
}

impl MaskKernel for Fill {
    fn apply<const M: u8>(&self, _start: usize, dst: &mut [Texel]) {
        for t in dst {
            store::<M>(t, self.color);
        }
    }
}

struct FillBlended {
    color: Texel,
    blend: Texel,
}

impl MaskKernel for FillBlended {
    fn apply<const M: u8>(&self, _start: usize, dst: &mut [Texel]) {
        for t in dst {
            let mut v = *t;
            for c in 0..4 {
                v.0[c] = t.0[c] * (1.0 - self.blend.0[c]) + self.color.0[c] * self.blend.0[c];
            }
            store::<M>(t, v);
        }
    }
}

struct Swap;

impl MaskPairKernel for Swap {
    fn apply<const M: u8>(&self, _start: usize, a: &mut [Texel], b: &mut [Texel]) {
        for (ta, tb) in a.iter_mut().zip(b.iter_mut()) {
            if M == 0xf {
                std::mem::swap(ta, tb);
                continue;
            }
            for c in 0..4 {
                if has(M, c) {
                    std::mem::swap(&mut ta.0[c], &mut tb.0[c]);
                }
            }
        }
    }
}

/// `dst[c] = src[c]` for masked channels.
pub fn copy(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    src: &PixelBuffer,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_same_size(dst, src, "copy")?;
    d.masked(mask, dst.texels_mut(), &CopyMasked { src: src.texels() })
}

/// `dst[c] = color[c]` for masked channels.
pub fn fill(d: &Dispatcher, dst: &mut PixelBuffer, color: Texel, mask: ChannelMask) -> TexResult<()> {
    d.masked(mask, dst.texels_mut(), &Fill { color })
}

/// `dst = dst * (1 - blend) + color * blend` with a per-channel blend vector.
pub fn fill_blended(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    color: Texel,
    blend: Texel,
    mask: ChannelMask,
) -> TexResult<()> {
    d.masked(mask, dst.texels_mut(), &FillBlended { color, blend })
}

/// Exchange the masked channels of two buffers.
pub fn swap_masked(
    d: &Dispatcher,
    a: &mut PixelBuffer,
    b: &mut PixelBuffer,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_same_size(a, b, "swap")?;
    d.masked_pair(mask, a.texels_mut(), b.texels_mut(), &Swap)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/basic.rs"]
mod tests;
