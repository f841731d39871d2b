//! Channel and mask specialization.
//!
//! Kernels are written once against const parameters; the dispatcher matches the runtime mask or
//! selector a single time per call and runs a monomorphized loop, so per-texel code never tests
//! mask bits at runtime.

use crate::foundation::error::TexResult;
use crate::foundation::texel::{Channel, ChannelMask, Texel};
use crate::parallel::dispatch::Dispatcher;

/// Kernel parameterized over a write mask (`M` in `1..=15`).
pub trait MaskKernel<T = Texel>: Sync {
    /// Process the window starting at texel index `start`.
    fn apply<const M: u8>(&self, start: usize, dst: &mut [T]);
}

/// Kernel parameterized over a single channel index (`C` in `0..4`).
pub trait ChannelKernel<T = Texel>: Sync {
    /// Process the window starting at texel index `start`.
    fn apply<const C: usize>(&self, start: usize, dst: &mut [T]);
}

/// Kernel parameterized over a destination and a source channel.
pub trait ChannelPairKernel: Sync {
    /// Process the window starting at texel index `start`.
    fn apply<const D: usize, const S: usize>(&self, start: usize, dst: &mut [Texel]);
}

/// Kernel parameterized over a source channel and a write mask.
pub trait ChannelMaskKernel: Sync {
    /// Process the window starting at texel index `start`.
    fn apply<const C: usize, const M: u8>(&self, start: usize, dst: &mut [Texel]);
}

/// Mask-specialized kernel over two buffers mutated together.
pub trait MaskPairKernel: Sync {
    /// Process matching windows of `a` and `b` starting at texel index `start`.
    fn apply<const M: u8>(&self, start: usize, a: &mut [Texel], b: &mut [Texel]);
}

/// Whether const mask `m` includes channel index `c`.
#[inline(always)]
pub const fn has(m: u8, c: usize) -> bool {
    m & (1 << c) != 0
}

/// Write the channels of `v` selected by `M` into `dst`.
#[inline(always)]
pub fn store<const M: u8>(dst: &mut Texel, v: Texel) {
    if M == 0xf {
        *dst = v;
        return;
    }
    if has(M, 0) {
        dst.0[0] = v.0[0];
    }
    if has(M, 1) {
        dst.0[1] = v.0[1];
    }
    if has(M, 2) {
        dst.0[2] = v.0[2];
    }
    if has(M, 3) {
        dst.0[3] = v.0[3];
    }
}

/// Apply `f` to each channel selected by `M`.
#[inline(always)]
pub fn map_masked<const M: u8>(dst: &mut Texel, mut f: impl FnMut(usize, f32) -> f32) {
    for c in 0..4 {
        if has(M, c) {
            dst.0[c] = f(c, dst.0[c]);
        }
    }
}

macro_rules! dispatch_mask {
    ($bits:expr, $m:ident => $body:expr) => {
        dispatch_mask!(@arms $bits, $m => $body; 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15)
    };
    (@arms $bits:expr, $m:ident => $body:expr; $($v:literal)*) => {
        match $bits {
            $( $v => {
                const $m: u8 = $v;
                $body
            } )*
            _ => Ok(()),
        }
    };
}

macro_rules! dispatch_channel {
    ($index:expr, $c:ident => $body:expr) => {
        match $index {
            0 => {
                const $c: usize = 0;
                $body
            }
            1 => {
                const $c: usize = 1;
                $body
            }
            2 => {
                const $c: usize = 2;
                $body
            }
            _ => {
                const $c: usize = 3;
                $body
            }
        }
    };
}

impl Dispatcher {
    /// Run a mask-specialized kernel over `dst`. An empty mask does nothing.
    pub fn masked<T, K>(&self, mask: ChannelMask, dst: &mut [T], kernel: &K) -> TexResult<()>
    where
        T: Send,
        K: MaskKernel<T>,
    {
        dispatch_mask!(mask.bits(), M => self.for_each_span(dst, |start, span| {
            kernel.apply::<M>(start, span);
            Ok(())
        }))
    }

    /// Run a mask-specialized kernel over whole rows of `dst` (`row_len` texels each).
    /// `start` is the first row of the window.
    pub fn masked_rows<T, K>(
        &self,
        mask: ChannelMask,
        dst: &mut [T],
        row_len: usize,
        kernel: &K,
    ) -> TexResult<()>
    where
        T: Send,
        K: MaskKernel<T>,
    {
        dispatch_mask!(mask.bits(), M => self.for_each_chunked(dst, row_len, |start, span| {
            kernel.apply::<M>(start, span);
            Ok(())
        }))
    }

    /// Run a mask-specialized kernel over two same-length buffers.
    pub fn masked_pair<K>(
        &self,
        mask: ChannelMask,
        a: &mut [Texel],
        b: &mut [Texel],
        kernel: &K,
    ) -> TexResult<()>
    where
        K: MaskPairKernel,
    {
        dispatch_mask!(mask.bits(), M => self.for_each_span_pair(a, b, |start, sa, sb| {
            kernel.apply::<M>(start, sa, sb);
            Ok(())
        }))
    }

    /// Run a channel-specialized kernel over `dst`.
    pub fn channel<T, K>(&self, channel: Channel, dst: &mut [T], kernel: &K) -> TexResult<()>
    where
        T: Send,
        K: ChannelKernel<T>,
    {
        dispatch_channel!(channel.index(), C => self.for_each_span(dst, |start, span| {
            kernel.apply::<C>(start, span);
            Ok(())
        }))
    }

    /// Run a kernel specialized on a destination and source channel.
    pub fn channel_pair<K>(
        &self,
        dst_channel: Channel,
        src_channel: Channel,
        dst: &mut [Texel],
        kernel: &K,
    ) -> TexResult<()>
    where
        K: ChannelPairKernel,
    {
        dispatch_channel!(dst_channel.index(), D => {
            dispatch_channel!(src_channel.index(), S => self.for_each_span(dst, |start, span| {
                kernel.apply::<D, S>(start, span);
                Ok(())
            }))
        })
    }

    /// Run a kernel specialized on a source channel and a write mask.
    pub fn channel_masked<K>(
        &self,
        channel: Channel,
        mask: ChannelMask,
        dst: &mut [Texel],
        kernel: &K,
    ) -> TexResult<()>
    where
        K: ChannelMaskKernel,
    {
        dispatch_channel!(channel.index(), C => {
            dispatch_mask!(mask.bits(), M => self.for_each_span(dst, |start, span| {
                kernel.apply::<C, M>(start, span);
                Ok(())
            }))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/parallel/specialize.rs"]
mod tests;
