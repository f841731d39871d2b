use serde::{Deserialize, Serialize};

use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::{ChannelMask, Texel};
use crate::memory::buffer::PixelBuffer;
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::{MaskKernel, map_masked};

/// Behaviour of a linear remap outside its input range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemapEdge {
    /// Continue the line past the endpoint, unclamped.
    #[default]
    Extrapolate,
    /// Output 0.
    Zero,
    /// Output 1.
    One,
}

/// Map `[from_lo, from_hi]` onto `[to_lo, to_hi]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearRemap {
    /// Input range start.
    pub from_lo: f32,
    /// Input range end.
    pub from_hi: f32,
    /// Output value at `from_lo`.
    pub to_lo: f32,
    /// Output value at `from_hi`.
    pub to_hi: f32,
    /// Policy for inputs below `from_lo`.
    #[serde(default)]
    pub below: RemapEdge,
    /// Policy for inputs above `from_hi`.
    #[serde(default)]
    pub above: RemapEdge,
}

impl LinearRemap {
    fn validate(&self) -> TexResult<()> {
        if self.from_lo.is_nan() || self.from_hi.is_nan() || self.from_lo >= self.from_hi {
            return Err(TexError::validation(format!(
                "remap input range [{}, {}] is empty",
                self.from_lo, self.from_hi
            )));
        }
        Ok(())
    }

    /// Remap one value.
    pub fn map(&self, x: f32) -> f32 {
        let edge = if x < self.from_lo {
            self.below
        } else if x > self.from_hi {
            self.above
        } else {
            RemapEdge::Extrapolate
        };
        match edge {
            RemapEdge::Zero => 0.0,
            RemapEdge::One => 1.0,
            RemapEdge::Extrapolate => {
                self.to_lo
                    + (x - self.from_lo) * (self.to_hi - self.to_lo) / (self.from_hi - self.from_lo)
            }
        }
    }
}

/// Weights of the five polynomial filter terms.
pub type PolyCoeffs = [f32; 5];

/// `clamp01(c0 + c1 x + c2 x^2 + c3 (1 - (1 - x)^2) + c4 (sin((x - 0.5) pi) + 1) / 2)`.
pub fn poly_value(c: &PolyCoeffs, x: f32) -> f32 {
    let ease_out = 1.0 - (1.0 - x) * (1.0 - x);
    let sine = ((x - 0.5) * std::f32::consts::PI).sin() * 0.5 + 0.5;
    (c[0] + c[1] * x + c[2] * x * x + c[3] * ease_out + c[4] * sine).clamp(0.0, 1.0)
}

struct PerValue<F> {
    f: F,
}

impl<F> MaskKernel for PerValue<F>
where
    F: Fn(f32) -> f32 + Sync,
{
    fn apply<const M: u8>(&self, _start: usize, dst: &mut [Texel]) {
        for t in dst {
            map_masked::<M>(t, |_, v| (self.f)(v));
        }
    }
}

fn per_value(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    mask: ChannelMask,
    f: impl Fn(f32) -> f32 + Sync,
) -> TexResult<()> {
    d.masked(mask, dst.texels_mut(), &PerValue { f })
}

/// Clamp masked channels into `[min, max]`; does nothing when `min >= max`.
pub fn clamp(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    min: f32,
    max: f32,
    mask: ChannelMask,
) -> TexResult<()> {
    if min >= max {
        return Ok(());
    }
    per_value(d, dst, mask, |v| v.clamp(min, max))
}

/// Polynomial tone curve, see [`poly_value`].
pub fn poly(d: &Dispatcher, dst: &mut PixelBuffer, c: PolyCoeffs, mask: ChannelMask) -> TexResult<()> {
    per_value(d, dst, mask, |v| poly_value(&c, v))
}

/// Piecewise linear remap.
pub fn remap(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    r: LinearRemap,
    mask: ChannelMask,
) -> TexResult<()> {
    r.validate()?;
    per_value(d, dst, mask, |v| r.map(v))
}

/// Threshold at `cutoff`: values below become 1, the rest 0. `rev` swaps the outputs.
pub fn stencil(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    cutoff: f32,
    rev: bool,
    mask: ChannelMask,
) -> TexResult<()> {
    if !(0.0..=1.0).contains(&cutoff) {
        return Err(TexError::validation(format!(
            "stencil cutoff {cutoff} outside [0, 1]"
        )));
    }
    let (below, above) = if rev { (0.0, 1.0) } else { (1.0, 0.0) };
    per_value(d, dst, mask, |v| if v < cutoff { below } else { above })
}

/// Quantize masked channels to `levels` steps.
pub fn posterize(
    d: &Dispatcher,
    dst: &mut PixelBuffer,
    levels: u32,
    mask: ChannelMask,
) -> TexResult<()> {
    if levels < 2 {
        return Err(TexError::validation("posterize needs at least 2 levels"));
    }
    let n = levels as f32;
    per_value(d, dst, mask, |v| (v * n).floor() / (n - 1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/ops/filter.rs"]
mod tests;
