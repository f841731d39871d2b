//! Numeric kernels over [`PixelBuffer`]s.
//!
//! Operations take same-size buffers; sizing operands to match is the caller's job (the registry
//! resamples into a transient buffer). Binary operations accept `None` as the source to read the
//! destination itself; every such kernel reads a texel's source value before writing it.

use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::Texel;
use crate::memory::buffer::PixelBuffer;

/// Copy, fill and masked swap.
pub mod basic;
/// Separable and 2D diffusion blur.
pub mod blur;
/// Point-field synthesis.
pub mod cellular;
/// Single-channel routing and blends.
pub mod channel;
/// Per-value filters.
pub mod filter;
/// Raw interleaved read and write.
pub mod io;
/// Seeded noise and turbulence.
pub mod noise;
/// Height to normal conversion.
pub mod normal;
/// Resizing, warping and sampling.
pub mod resample;

pub(crate) fn ensure_same_size(dst: &PixelBuffer, src: &PixelBuffer, op: &str) -> TexResult<()> {
    if dst.same_size(src) {
        return Ok(());
    }
    Err(TexError::validation(format!(
        "{op}: operand is {}x{}, destination is {}x{}",
        src.width(),
        src.height(),
        dst.width(),
        dst.height()
    )))
}

pub(crate) fn ensure_source(
    dst: &PixelBuffer,
    src: Option<&PixelBuffer>,
    op: &str,
) -> TexResult<()> {
    match src {
        Some(src) => ensure_same_size(dst, src, op),
        None => Ok(()),
    }
}

/// Visit each destination texel with its source texel; `None` pairs a texel with itself.
#[inline(always)]
pub(crate) fn zip_source(
    dst: &mut [Texel],
    src: Option<&[Texel]>,
    start: usize,
    mut f: impl FnMut(&mut Texel, Texel),
) {
    match src {
        Some(src) => {
            for (t, s) in dst.iter_mut().zip(&src[start..]) {
                f(t, *s);
            }
        }
        None => {
            for t in dst {
                let s = *t;
                f(t, s);
            }
        }
    }
}
