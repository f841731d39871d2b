use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::{Channel, ChannelMask, Texel};
use crate::memory::buffer::PixelBuffer;
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::{ChannelKernel, MaskKernel, store};

/// Float to byte conversion used by every 8-bit read.
#[inline]
pub fn to_u8(v: f32) -> u8 {
    (v * 255.5) as u8
}

fn check_len(len: usize, expected: usize, what: &str) -> TexResult<()> {
    if len != expected {
        return Err(TexError::validation(format!(
            "{what}: got {len} elements, expected {expected}"
        )));
    }
    Ok(())
}

/// Interleaved 8-bit RGBA copy of `src`.
pub fn read_rgba8(d: &Dispatcher, src: &PixelBuffer) -> TexResult<Vec<u8>> {
    let mut out = vec![0u8; src.pixel_count() * 4];
    let texels = src.texels();
    d.for_each_chunked(&mut out, 4, |start, span| {
        for (px, t) in span.chunks_exact_mut(4).zip(&texels[start..]) {
            for c in 0..4 {
                px[c] = to_u8(t.0[c]);
            }
        }
        Ok(())
    })?;
    Ok(out)
}

/// Interleaved `f32` RGBA copy of `src`.
pub fn read_rgba_f32(src: &PixelBuffer) -> Vec<f32> {
    src.texels().iter().flat_map(|t| t.0).collect()
}

/// Overwrite `dst` from interleaved 8-bit RGBA (each channel divided by 255).
pub fn write_rgba8(d: &Dispatcher, dst: &mut PixelBuffer, bytes: &[u8]) -> TexResult<()> {
    check_len(bytes.len(), dst.pixel_count() * 4, "write_rgba8")?;
    d.for_each_span(dst.texels_mut(), |start, span| {
        for (t, px) in span.iter_mut().zip(bytes[start * 4..].chunks_exact(4)) {
            *t = Texel(std::array::from_fn(|c| f32::from(px[c]) / 255.0));
        }
        Ok(())
    })
}

/// Overwrite `dst` from interleaved `f32` RGBA.
pub fn write_rgba_f32(d: &Dispatcher, dst: &mut PixelBuffer, values: &[f32]) -> TexResult<()> {
    check_len(values.len(), dst.pixel_count() * 4, "write_rgba_f32")?;
    d.for_each_span(dst.texels_mut(), |start, span| {
        for (t, px) in span.iter_mut().zip(values[start * 4..].chunks_exact(4)) {
            *t = Texel([px[0], px[1], px[2], px[3]]);
        }
        Ok(())
    })
}

struct ReadChannel<'a> {
    src: &'a [Texel],
}

impl ChannelKernel<u8> for ReadChannel<'_> {
    fn apply<const C: usize>(&self, start: usize, dst: &mut [u8]) {
        for (v, t) in dst.iter_mut().zip(&self.src[start..]) {
            *v = to_u8(t.0[C]);
        }
    }
}

impl ChannelKernel<f32> for ReadChannel<'_> {
    fn apply<const C: usize>(&self, start: usize, dst: &mut [f32]) {
        for (v, t) in dst.iter_mut().zip(&self.src[start..]) {
            *v = t.0[C];
        }
    }
}

/// One channel of `src` as bytes.
pub fn read_channel_u8(d: &Dispatcher, src: &PixelBuffer, ch: Channel) -> TexResult<Vec<u8>> {
    let mut out = vec![0u8; src.pixel_count()];
    d.channel(ch, &mut out, &ReadChannel { src: src.texels() })?;
    Ok(out)
}

/// One channel of `src` as floats.
pub fn read_channel_f32(d: &Dispatcher, src: &PixelBuffer, ch: Channel) -> TexResult<Vec<f32>> {
    let mut out = vec![0f32; src.pixel_count()];
    d.channel(ch, &mut out, &ReadChannel { src: src.texels() })?;
    Ok(out)
}

struct WriteChannel<'a> {
    values: &'a [f32],
}

impl MaskKernel for WriteChannel<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        for (t, v) in dst.iter_mut().zip(&self.values[start..]) {
            store::<M>(t, Texel::splat(*v));
        }
    }
}

/// Write one byte per texel (divided by 255) into every masked channel.
pub fn write_channel_u8(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    bytes: &[u8],
    mask: ChannelMask,
) -> TexResult<()> {
    check_len(bytes.len(), dst.pixel_count(), "write_channel_u8")?;
    let values: Vec<f32> = bytes.iter().map(|b| f32::from(*b) / 255.0).collect();
    d.masked(mask, dst.texels_mut(), &WriteChannel { values: &values })
}

/// Write one float per texel into every masked channel.
pub fn write_channel_f32(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    values: &[f32],
    mask: ChannelMask,
) -> TexResult<()> {
    check_len(values.len(), dst.pixel_count(), "write_channel_f32")?;
    d.masked(mask, dst.texels_mut(), &WriteChannel { values })
}

#[cfg(test)]
#[path = "../../tests/unit/ops/io.rs"]
mod tests;
