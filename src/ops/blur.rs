use serde::{Deserialize, Serialize};

use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::{ChannelMask, Texel};
use crate::kernel::blur::{BlurKernel1d, BlurKernel2d};
use crate::memory::buffer::PixelBuffer;
use crate::parallel::dispatch::Dispatcher;
use crate::parallel::specialize::{MaskKernel, map_masked};

/// Taps of a blur pass as `(dx, dy, normalized weight)`.
struct Taps {
    taps: Vec<(i64, i64, f64)>,
}

impl Taps {
    fn square(k: &BlurKernel2d) -> Self {
        let (rx, ry) = ((k.width() / 2) as i64, (k.height() / 2) as i64);
        let mut taps = Vec::with_capacity(k.width() * k.height());
        for y in 0..k.height() {
            for x in 0..k.width() {
                taps.push((x as i64 - rx, y as i64 - ry, k.weighted(x, y)));
            }
        }
        Self { taps }
    }

    fn horizontal(k: &BlurKernel1d) -> Self {
        let r = k.radius() as i64;
        let taps = (0..k.size())
            .map(|i| (i as i64 - r, 0, k.weighted(i)))
            .collect();
        Self { taps }
    }

    fn vertical(k: &BlurKernel1d) -> Self {
        let r = k.radius() as i64;
        let taps = (0..k.size())
            .map(|i| (0, i as i64 - r, k.weighted(i)))
            .collect();
        Self { taps }
    }
}

struct Convolve<'a> {
    src: &'a PixelBuffer,
    taps: &'a Taps,
    factor: f32,
}

impl MaskKernel for Convolve<'_> {
    fn apply<const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        let w = self.src.width() as usize;
        let f = self.factor;
        for (i, t) in dst.iter_mut().enumerate() {
            let idx = start + i;
            let (x, y) = ((idx % w) as i64, (idx / w) as i64);
            let mut acc = [0f64; 4];
            for &(dx, dy, wt) in &self.taps.taps {
                let s = self.src.get_wrapped(x + dx, y + dy);
                for c in 0..4 {
                    acc[c] += f64::from(s.0[c]) * wt;
                }
            }
            if f == 1.0 {
                map_masked::<M>(t, |c, _| acc[c] as f32);
            } else {
                map_masked::<M>(t, |c, x| x * (1.0 - f) + acc[c] as f32 * f);
            }
        }
    }
}

fn convolve(
    d: &Dispatcher,
    src: &PixelBuffer,
    taps: &Taps,
    factor: f32,
    mask: ChannelMask,
) -> TexResult<PixelBuffer> {
    if !factor.is_finite() {
        return Err(TexError::validation("blur factor must be finite"));
    }
    let mut out = src.duplicate()?;
    let k = Convolve { src, taps, factor };
    d.masked(mask, out.texels_mut(), &k)?;
    Ok(out)
}

/// 2D blur of `src`. Masked channels become `src * (1 - factor) + blurred * factor`
/// (exactly the blurred value when `factor == 1`); the rest are copied from `src`.
pub fn blur(
    d: &Dispatcher,
    src: &PixelBuffer,
    kernel: &BlurKernel2d,
    factor: f32,
    mask: ChannelMask,
) -> TexResult<PixelBuffer> {
    convolve(d, src, &Taps::square(kernel), factor, mask)
}

/// Horizontal pass of [`blur`] with a 1D kernel.
pub fn blur_horizontal(
    d: &Dispatcher,
    src: &PixelBuffer,
    kernel: &BlurKernel1d,
    factor: f32,
    mask: ChannelMask,
) -> TexResult<PixelBuffer> {
    convolve(d, src, &Taps::horizontal(kernel), factor, mask)
}

/// Vertical pass of [`blur`] with a 1D kernel.
pub fn blur_vertical(
    d: &Dispatcher,
    src: &PixelBuffer,
    kernel: &BlurKernel1d,
    factor: f32,
    mask: ChannelMask,
) -> TexResult<PixelBuffer> {
    convolve(d, src, &Taps::vertical(kernel), factor, mask)
}

/// Largest diffusion level accepted for a blur pass.
pub const MAX_BLUR_LEVEL: u32 = 16;

/// Kernel shape of a blur pass, by diffusion level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlurShape {
    /// Same level on both axes.
    Square {
        /// Diffusion level.
        level: u32,
    },
    /// Independent levels per axis.
    Outer {
        /// Horizontal level.
        x: u32,
        /// Vertical level.
        y: u32,
    },
    /// Horizontal pass only.
    Horizontal {
        /// Diffusion level.
        level: u32,
    },
    /// Vertical pass only.
    Vertical {
        /// Diffusion level.
        level: u32,
    },
}

impl BlurShape {
    fn levels(self) -> [u32; 2] {
        match self {
            Self::Square { level } => [level, level],
            Self::Outer { x, y } => [x, y],
            Self::Horizontal { level } | Self::Vertical { level } => [level, 0],
        }
    }

    /// Blur `src` with this shape.
    pub fn run(
        self,
        d: &Dispatcher,
        src: &PixelBuffer,
        factor: f32,
        mask: ChannelMask,
    ) -> TexResult<PixelBuffer> {
        if let Some(l) = self.levels().into_iter().find(|l| *l > MAX_BLUR_LEVEL) {
            return Err(TexError::validation(format!(
                "blur level {l} exceeds {MAX_BLUR_LEVEL}"
            )));
        }
        match self {
            Self::Square { level } => {
                blur(d, src, &BlurKernel2d::square(&BlurKernel1d::new(level)), factor, mask)
            }
            Self::Outer { x, y } => {
                let k = BlurKernel2d::outer(&BlurKernel1d::new(x), &BlurKernel1d::new(y));
                blur(d, src, &k, factor, mask)
            }
            Self::Horizontal { level } => {
                blur_horizontal(d, src, &BlurKernel1d::new(level), factor, mask)
            }
            Self::Vertical { level } => {
                blur_vertical(d, src, &BlurKernel1d::new(level), factor, mask)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/blur.rs"]
mod tests;
