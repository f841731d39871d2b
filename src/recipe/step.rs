use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::{Channel, ChannelMask, Texel};
use crate::ops::blur::BlurShape;
use crate::ops::filter::{LinearRemap, PolyCoeffs};

fn one() -> f32 {
    1.0
}

/// An ordered list of registry operations over named textures and point sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    /// Steps executed in order.
    pub steps: Vec<Step>,
}

impl Recipe {
    /// Parse a JSON recipe.
    pub fn from_json_str(s: &str) -> TexResult<Self> {
        Ok(serde_json::from_str(s).context("parse recipe JSON")?)
    }

    /// Read and parse a JSON recipe file.
    pub fn load(path: &Path) -> TexResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TexError::io(path, e))?;
        Self::from_json_str(&text)
    }
}

/// One recipe step. Texture operands are referred to by name.
///
/// Steps with an `into` field write a new texture under that name when it is set and replace
/// `target` otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
#[allow(missing_docs)]
pub enum Step {
    Create {
        name: String,
        width: u32,
        height: u32,
    },
    LoadImage {
        name: String,
        path: PathBuf,
    },
    Clone {
        target: String,
        name: String,
    },
    Destroy {
        target: String,
    },
    Resize {
        target: String,
        width: u32,
        height: u32,
    },
    Fill {
        target: String,
        color: Texel,
        #[serde(default)]
        mask: ChannelMask,
    },
    FillBlended {
        target: String,
        color: Texel,
        blend: Texel,
        #[serde(default)]
        mask: ChannelMask,
    },
    FillBackground {
        target: String,
        color: Texel,
        #[serde(default)]
        mask: ChannelMask,
    },
    FillWithChannel {
        target: String,
        source: String,
        channel: Channel,
        color: Texel,
        #[serde(default)]
        mask: ChannelMask,
    },
    Copy {
        target: String,
        source: String,
        #[serde(default)]
        mask: ChannelMask,
    },
    Swap {
        target: String,
        source: String,
        #[serde(default)]
        mask: ChannelMask,
    },
    Clamp {
        target: String,
        min: f32,
        max: f32,
        #[serde(default)]
        mask: ChannelMask,
    },
    Poly {
        target: String,
        coeffs: PolyCoeffs,
        #[serde(default)]
        mask: ChannelMask,
    },
    Remap {
        target: String,
        remap: LinearRemap,
        #[serde(default)]
        mask: ChannelMask,
    },
    Stencil {
        target: String,
        cutoff: f32,
        #[serde(default)]
        rev: bool,
        #[serde(default)]
        mask: ChannelMask,
    },
    Posterize {
        target: String,
        levels: u32,
        #[serde(default)]
        mask: ChannelMask,
    },
    CopyChannel {
        target: String,
        source: String,
        channel: Channel,
        #[serde(default)]
        mask: ChannelMask,
    },
    SwapChannels {
        target: String,
        target_channel: Channel,
        source: String,
        source_channel: Channel,
    },
    BlendChannels {
        target: String,
        source: String,
        channel: Channel,
        blend: f32,
        #[serde(default)]
        mask: ChannelMask,
    },
    ChannelDiff {
        target: String,
        source: String,
        channel: Channel,
        #[serde(default)]
        mask: ChannelMask,
    },
    TextureDiff {
        target: String,
        source: String,
        #[serde(default)]
        mask: ChannelMask,
    },
    Merge {
        target: String,
        source: String,
        blend: f32,
        #[serde(default)]
        mask: ChannelMask,
    },
    BlendWithAlpha {
        target: String,
        source: String,
        alpha: String,
        channel: Channel,
        #[serde(default)]
        mask: ChannelMask,
    },
    Warp {
        target: String,
        map: String,
        mult: f32,
        #[serde(default)]
        mask: ChannelMask,
        #[serde(default)]
        into: Option<String>,
    },
    Lens {
        target: String,
        source: String,
        #[serde(default)]
        mask: ChannelMask,
        #[serde(default)]
        into: Option<String>,
    },
    Shift {
        target: String,
        x: f32,
        y: f32,
        #[serde(default)]
        mask: ChannelMask,
        #[serde(default)]
        into: Option<String>,
    },
    Blur {
        target: String,
        shape: BlurShape,
        #[serde(default = "one")]
        factor: f32,
        #[serde(default)]
        mask: ChannelMask,
        #[serde(default)]
        into: Option<String>,
    },
    Turbulence {
        target: String,
        levels: u32,
        persistence: f32,
        #[serde(default)]
        mask: ChannelMask,
        #[serde(default)]
        into: Option<String>,
    },
    Seed {
        device: u32,
        seed: u64,
    },
    SeedText {
        device: u32,
        text: String,
    },
    Noise {
        target: String,
        device: u32,
        #[serde(default)]
        mask: ChannelMask,
    },
    WhiteNoise {
        target: String,
        device: u32,
        #[serde(default)]
        mask: ChannelMask,
    },
    NormalMap {
        target: String,
        #[serde(default = "one")]
        mult: f32,
    },
    MakePoints {
        name: String,
        device: u32,
        count: usize,
    },
    SpreadPoints {
        points: String,
        iterations: u32,
        #[serde(default = "half")]
        strength: f64,
    },
    Cellular {
        target: String,
        points: String,
        octaves: [u8; 4],
        range: f32,
    },
    Delaunay {
        target: String,
        points: String,
        range: f32,
        #[serde(default)]
        mask: ChannelMask,
    },
    Voronoi {
        target: String,
        points: String,
        range: f32,
        #[serde(default)]
        mask: ChannelMask,
    },
    WriteBitmap {
        target: String,
        path: PathBuf,
    },
}

fn half() -> f64 {
    0.5
}

#[cfg(test)]
#[path = "../../tests/unit/recipe/step.rs"]
mod tests;
