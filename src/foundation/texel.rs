use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TexError, TexResult};

/// One RGBA texel with `f32` channels.
///
/// Values are not clamped; operations decide their own range policy. The 16-byte alignment
/// keeps a texel on a single vector lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[repr(C, align(16))]
pub struct Texel(pub [f32; 4]);

impl Texel {
    /// All channels zero.
    pub const ZERO: Self = Self([0.0; 4]);

    /// Build a texel from its four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    /// Same value in every channel.
    pub const fn splat(v: f32) -> Self {
        Self([v; 4])
    }

    /// Channelwise `self * (1 - t) + other * t`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Channelwise product.
    pub fn mul_channels(self, other: Self) -> Self {
        Self(std::array::from_fn(|c| self.0[c] * other.0[c]))
    }

    /// Channelwise clamp into `[lo, hi]`.
    pub fn clamp(self, lo: f32, hi: f32) -> Self {
        Self(self.0.map(|v| v.clamp(lo, hi)))
    }
}

impl From<[f32; 4]> for Texel {
    fn from(v: [f32; 4]) -> Self {
        Self(v)
    }
}

impl Index<usize> for Texel {
    type Output = f32;

    fn index(&self, idx: usize) -> &f32 {
        &self.0[idx]
    }
}

impl IndexMut<usize> for Texel {
    fn index_mut(&mut self, idx: usize) -> &mut f32 {
        &mut self.0[idx]
    }
}

impl Add for Texel {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|c| self.0[c] + rhs.0[c]))
    }
}

impl AddAssign for Texel {
    fn add_assign(&mut self, rhs: Self) {
        for c in 0..4 {
            self.0[c] += rhs.0[c];
        }
    }
}

impl Sub for Texel {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|c| self.0[c] - rhs.0[c]))
    }
}

impl Mul<f32> for Texel {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self(self.0.map(|v| v * rhs))
    }
}

/// A single channel, selected on the wire by one of the bit values 1, 2, 4 or 8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Channel(u8);

impl Channel {
    /// Red.
    pub const R: Self = Self(0);
    /// Green.
    pub const G: Self = Self(1);
    /// Blue.
    pub const B: Self = Self(2);
    /// Alpha.
    pub const A: Self = Self(3);

    /// Decode a selector bit (1, 2, 4 or 8).
    pub fn from_selector(sel: u32) -> TexResult<Self> {
        match sel {
            1 => Ok(Self::R),
            2 => Ok(Self::G),
            4 => Ok(Self::B),
            8 => Ok(Self::A),
            other => Err(TexError::InvalidChannelSelector(other)),
        }
    }

    /// Channel index in `0..4`.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// The selector bit for this channel.
    pub fn selector(self) -> u32 {
        1 << self.0
    }
}

/// 4-bit channel write-mask (bit 0 = R … bit 3 = A).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ChannelMask(u8);

impl ChannelMask {
    /// No channel.
    pub const NONE: Self = Self(0);
    /// All four channels.
    pub const ALL: Self = Self(0xf);

    /// Decode a raw mask; bits above `0xf` are rejected.
    pub fn new(bits: u32) -> TexResult<Self> {
        if bits > 0xf {
            return Err(TexError::InvalidMask(bits));
        }
        Ok(Self(bits as u8))
    }

    /// Mask containing exactly `ch`.
    pub fn only(ch: Channel) -> Self {
        Self(1 << ch.0)
    }

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// `true` when no channel is selected.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` when every channel is selected.
    pub fn is_all(self) -> bool {
        self.0 == 0xf
    }

    /// Whether `ch` is selected.
    pub fn contains(self, ch: Channel) -> bool {
        self.0 & (1 << ch.0) != 0
    }
}

impl TryFrom<u32> for Channel {
    type Error = TexError;

    fn try_from(sel: u32) -> TexResult<Self> {
        Self::from_selector(sel)
    }
}

impl From<Channel> for u32 {
    fn from(ch: Channel) -> u32 {
        ch.selector()
    }
}

impl TryFrom<u32> for ChannelMask {
    type Error = TexError;

    fn try_from(bits: u32) -> TexResult<Self> {
        Self::new(bits)
    }
}

impl From<ChannelMask> for u32 {
    fn from(mask: ChannelMask) -> u32 {
        u32::from(mask.0)
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/texel.rs"]
mod tests;
