use crate::foundation::error::TexResult;
use crate::foundation::texel::{Channel, ChannelMask, Texel};
use crate::memory::buffer::PixelBuffer;
use crate::ops::{ensure_same_size, ensure_source, zip_source};
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::{ChannelMaskKernel, MaskKernel, map_masked};

fn texels(src: Option<&PixelBuffer>) -> Option<&[Texel]> {
    src.map(PixelBuffer::texels)
}

struct SpreadChannel<'a> {
    src: Option<&'a [Texel]>,
}

impl ChannelMaskKernel for SpreadChannel<'_> {
    fn apply<const C: usize, const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        zip_source(dst, self.src, start, |t, s| {
            let v = s.0[C];
            map_masked::<M>(t, |_, _| v);
        });
    }
}

/// Write `src[ch]` into every masked channel of `dst`.
///
/// With `src == None` the channel is read from `dst` before any of the texel's channels is
/// overwritten, so `ch` may itself be part of the mask.
pub fn copy_channel(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    src: Option<&PixelBuffer>,
    ch: Channel,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_source(dst, src, "copy_channel")?;
    let k = SpreadChannel { src: texels(src) };
    d.channel_masked(ch, mask, dst.texels_mut(), &k)
}

/// Exchange `a[a_ch]` and `b[b_ch]`.
pub fn swap_channels(
    d: &Dispatcher,
    a: &mut PixelBuffer,
    a_ch: Channel,
    b: &mut PixelBuffer,
    b_ch: Channel,
) -> TexResult<()> {
    ensure_same_size(a, b, "swap_channels")?;
    let (ai, bi) = (a_ch.index(), b_ch.index());
    d.for_each_span_pair(a.texels_mut(), b.texels_mut(), |_, sa, sb| {
        for (ta, tb) in sa.iter_mut().zip(sb.iter_mut()) {
            std::mem::swap(&mut ta.0[ai], &mut tb.0[bi]);
        }
        Ok(())
    })
}

/// Exchange two channels of the same buffer.
pub fn swap_channels_within(
    d: &Dispatcher,
    buf: &mut PixelBuffer,
    a_ch: Channel,
    b_ch: Channel,
) -> TexResult<()> {
    let (ai, bi) = (a_ch.index(), b_ch.index());
    d.for_each_span(buf.texels_mut(), |_, span| {
        for t in span {
            t.0.swap(ai, bi);
        }
        Ok(())
    })
}

struct BlendChannel<'a> {
    src: Option<&'a [Texel]>,
    blend: f32,
}

impl ChannelMaskKernel for BlendChannel<'_> {
    fn apply<const C: usize, const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        let b = self.blend;
        zip_source(dst, self.src, start, |t, s| {
            let v = s.0[C];
            map_masked::<M>(t, |_, x| x * (1.0 - b) + v * b);
        });
    }
}

/// `dst[c] = dst[c] * (1 - blend) + src[ch] * blend` for masked channels.
pub fn blend_channels(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    src: Option<&PixelBuffer>,
    ch: Channel,
    blend: f32,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_source(dst, src, "blend_channels")?;
    let k = BlendChannel {
        src: texels(src),
        blend,
    };
    d.channel_masked(ch, mask, dst.texels_mut(), &k)
}

struct ChannelDiff<'a> {
    src: Option<&'a [Texel]>,
}

impl ChannelMaskKernel for ChannelDiff<'_> {
    fn apply<const C: usize, const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        zip_source(dst, self.src, start, |t, s| {
            let v = s.0[C];
            map_masked::<M>(t, |_, x| (x - v).abs());
        });
    }
}

/// `dst[c] = |dst[c] - src[ch]|` for masked channels.
pub fn channel_diff(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    src: Option<&PixelBuffer>,
    ch: Channel,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_source(dst, src, "channel_diff")?;
    d.channel_masked(ch, mask, dst.texels_mut(), &ChannelDiff { src: texels(src) })
}

struct TextureDiff<'a> {
    src: Option<&'a [Texel]>,
}

impl MaskKernel for TextureDiff<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        zip_source(dst, self.src, start, |t, s| {
            map_masked::<M>(t, |c, x| (x - s.0[c]).abs());
        });
    }
}

/// `dst[c] = |dst[c] - src[c]|` for masked channels.
pub fn texture_diff(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    src: Option<&PixelBuffer>,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_source(dst, src, "texture_diff")?;
    d.masked(mask, dst.texels_mut(), &TextureDiff { src: texels(src) })
}

struct Merge<'a> {
    src: Option<&'a [Texel]>,
    blend: f32,
}

impl MaskKernel for Merge<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        let b = self.blend;
        zip_source(dst, self.src, start, |t, s| {
            map_masked::<M>(t, |c, x| x * (1.0 - b) + s.0[c] * b);
        });
    }
}

/// `dst[c] = dst[c] * (1 - blend) + src[c] * blend` for masked channels.
pub fn merge(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    src: Option<&PixelBuffer>,
    blend: f32,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_source(dst, src, "merge")?;
    let k = Merge {
        src: texels(src),
        blend,
    };
    d.masked(mask, dst.texels_mut(), &k)
}

struct BlendWithAlpha<'a> {
    src: Option<&'a [Texel]>,
    alpha: Option<&'a [Texel]>,
}

impl ChannelMaskKernel for BlendWithAlpha<'_> {
    fn apply<const C: usize, const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        for (i, t) in dst.iter_mut().enumerate() {
            let s = self.src.map_or(*t, |s| s[start + i]);
            let a = self.alpha.map_or(t.0[C], |a| a[start + i].0[C]);
            map_masked::<M>(t, |c, x| x * (1.0 - a) + s.0[c] * a);
        }
    }
}

/// `dst[c] = dst[c] * (1 - a) + src[c] * a` where `a = alpha[ch]`, for masked channels.
pub fn blend_with_alpha(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    src: Option<&PixelBuffer>,
    alpha: Option<&PixelBuffer>,
    ch: Channel,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_source(dst, src, "blend_with_alpha")?;
    ensure_source(dst, alpha, "blend_with_alpha")?;
    let k = BlendWithAlpha {
        src: texels(src),
        alpha: texels(alpha),
    };
    d.channel_masked(ch, mask, dst.texels_mut(), &k)
}

struct FillBackground {
    color: Texel,
}

impl MaskKernel for FillBackground {
    fn apply<const M: u8>(&self, _start: usize, dst: &mut [Texel]) {
        for t in dst {
            let a = t.0[3];
            map_masked::<M>(t, |c, x| self.color.0[c] * (1.0 - a) + x * a);
        }
    }
}

/// Composite `dst` over a solid `color` using `dst`'s own alpha.
pub fn fill_background(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    color: Texel,
    mask: ChannelMask,
) -> TexResult<()> {
    d.masked(mask, dst.texels_mut(), &FillBackground { color })
}

struct FillWithChannel<'a> {
    src: Option<&'a [Texel]>,
    color: Texel,
}

impl ChannelMaskKernel for FillWithChannel<'_> {
    fn apply<const C: usize, const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        zip_source(dst, self.src, start, |t, s| {
            let a = s.0[C];
            map_masked::<M>(t, |c, x| x * (1.0 - a) + self.color.0[c] * a);
        });
    }
}

/// Paint `color` into `dst` with coverage taken from `src[ch]`.
pub fn fill_with_channel(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    src: Option<&PixelBuffer>,
    ch: Channel,
    color: Texel,
    mask: ChannelMask,
) -> TexResult<()> {
    ensure_source(dst, src, "fill_with_channel")?;
    let k = FillWithChannel {
        src: texels(src),
        color,
    };
    d.channel_masked(ch, mask, dst.texels_mut(), &k)
}

#[cfg(test)]
#[path = "../../tests/unit/ops/channel.rs"]
mod tests;
