use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::foundation::error::{TexError, TexResult};
use crate::geometry::field::DelaunayField;
use crate::random::point_set::PointSet;
use crate::recipe::step::{Recipe, Step};
use crate::registry::manager::{TextureHandle, TextureRegistry};
use crate::registry::resource::ResourceBackend;

/// Smallest edge a recipe may request.
pub const RECIPE_MIN_EDGE: u32 = 16;
/// Largest edge a recipe may request.
pub const RECIPE_MAX_EDGE: u32 = 4096;

/// What a finished recipe left behind.
#[derive(Debug, Default)]
pub struct RecipeOutcome {
    /// Name to handle of every texture still registered.
    pub textures: BTreeMap<String, TextureHandle>,
    /// Bitmaps written, in order.
    pub written: Vec<PathBuf>,
}

struct Points {
    set: PointSet,
    field: Option<DelaunayField>,
}

impl Points {
    fn field(&mut self) -> TexResult<&DelaunayField> {
        let field = match self.field.take() {
            Some(f) => f,
            None => DelaunayField::new(&self.set)?,
        };
        Ok(self.field.insert(field))
    }
}

/// Named textures and point sets of one recipe run.
struct Scope<'r, B: ResourceBackend> {
    reg: &'r mut TextureRegistry<B>,
    base_dir: &'r Path,
    textures: BTreeMap<String, TextureHandle>,
    points: BTreeMap<String, Points>,
    written: Vec<PathBuf>,
}

fn named_points<'a>(
    points: &'a mut BTreeMap<String, Points>,
    name: &str,
) -> TexResult<&'a mut Points> {
    points
        .get_mut(name)
        .ok_or_else(|| TexError::validation(format!("unknown point set '{name}'")))
}

fn check_recipe_size(width: u32, height: u32) -> TexResult<()> {
    for edge in [width, height] {
        if !(RECIPE_MIN_EDGE..=RECIPE_MAX_EDGE).contains(&edge) || !edge.is_power_of_two() {
            return Err(TexError::validation(format!(
                "recipe sizes must be powers of two in [{RECIPE_MIN_EDGE}, {RECIPE_MAX_EDGE}], got {width}x{height}"
            )));
        }
    }
    Ok(())
}

impl<B: ResourceBackend> Scope<'_, B> {
    fn tex(&self, name: &str) -> TexResult<TextureHandle> {
        self.textures
            .get(name)
            .copied()
            .ok_or_else(|| TexError::validation(format!("unknown texture '{name}'")))
    }

    fn bind(&mut self, name: &str, h: TextureHandle) -> TexResult<()> {
        if let Some(old) = self.textures.insert(name.to_string(), h)
            && old != h
        {
            self.reg.destroy(old)?;
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Run an out-of-place step, registering the result under `into` or replacing `target`.
    fn out_of_place(
        &mut self,
        target: &str,
        into: Option<&str>,
        fresh: impl FnOnce(&mut TextureRegistry<B>, TextureHandle) -> TexResult<TextureHandle>,
        in_place: impl FnOnce(&mut TextureRegistry<B>, TextureHandle) -> TexResult<()>,
    ) -> TexResult<()> {
        let h = self.tex(target)?;
        match into {
            Some(name) => {
                let out = fresh(&mut *self.reg, h)?;
                self.bind(name, out)
            }
            None => in_place(&mut *self.reg, h),
        }
    }

    fn step(&mut self, step: &Step) -> TexResult<()> {
        match step {
            Step::Create {
                name,
                width,
                height,
            } => {
                check_recipe_size(*width, *height)?;
                let h = self.reg.create(*width, *height)?;
                self.bind(name, h)
            }
            Step::LoadImage { name, path } => {
                let h = self.reg.load_image(&self.resolve(path))?;
                let (w, hh) = self.reg.dimensions(h)?;
                if let Err(e) = check_recipe_size(w, hh) {
                    self.reg.destroy(h)?;
                    return Err(e);
                }
                self.bind(name, h)
            }
            Step::Clone { target, name } => {
                let h = self.reg.clone_texture(self.tex(target)?)?;
                self.bind(name, h)
            }
            Step::Destroy { target } => {
                let h = self.tex(target)?;
                self.reg.destroy(h)?;
                self.textures.remove(target);
                Ok(())
            }
            Step::Resize {
                target,
                width,
                height,
            } => {
                check_recipe_size(*width, *height)?;
                self.reg.resize(self.tex(target)?, *width, *height)
            }
            Step::Fill {
                target,
                color,
                mask,
            } => self.reg.fill(self.tex(target)?, *color, *mask),
            Step::FillBlended {
                target,
                color,
                blend,
                mask,
            } => self
                .reg
                .fill_blended(self.tex(target)?, *color, *blend, *mask),
            Step::FillBackground {
                target,
                color,
                mask,
            } => self.reg.fill_background(self.tex(target)?, *color, *mask),
            Step::FillWithChannel {
                target,
                source,
                channel,
                color,
                mask,
            } => {
                let (dst, src) = (self.tex(target)?, self.tex(source)?);
                self.reg.fill_with_channel(dst, src, *channel, *color, *mask)
            }
            Step::Copy {
                target,
                source,
                mask,
            } => {
                let (dst, src) = (self.tex(target)?, self.tex(source)?);
                self.reg.copy(dst, src, *mask)
            }
            Step::Swap {
                target,
                source,
                mask,
            } => {
                let (a, b) = (self.tex(target)?, self.tex(source)?);
                self.reg.swap(a, b, *mask)
            }
            Step::Clamp {
                target,
                min,
                max,
                mask,
            } => self.reg.clamp(self.tex(target)?, *min, *max, *mask),
            Step::Poly {
                target,
                coeffs,
                mask,
            } => self.reg.poly(self.tex(target)?, *coeffs, *mask),
            Step::Remap {
                target,
                remap,
                mask,
            } => self.reg.remap(self.tex(target)?, *remap, *mask),
            Step::Stencil {
                target,
                cutoff,
                rev,
                mask,
            } => self.reg.stencil(self.tex(target)?, *cutoff, *rev, *mask),
            Step::Posterize {
                target,
                levels,
                mask,
            } => self.reg.posterize(self.tex(target)?, *levels, *mask),
            Step::CopyChannel {
                target,
                source,
                channel,
                mask,
            } => {
                let (dst, src) = (self.tex(target)?, self.tex(source)?);
                self.reg.copy_channel(dst, src, *channel, *mask)
            }
            Step::SwapChannels {
                target,
                target_channel,
                source,
                source_channel,
            } => {
                let (a, b) = (self.tex(target)?, self.tex(source)?);
                self.reg
                    .swap_channels(a, *target_channel, b, *source_channel)
            }
            Step::BlendChannels {
                target,
                source,
                channel,
                blend,
                mask,
            } => {
                let (dst, src) = (self.tex(target)?, self.tex(source)?);
                self.reg.blend_channels(dst, src, *channel, *blend, *mask)
            }
            Step::ChannelDiff {
                target,
                source,
                channel,
                mask,
            } => {
                let (dst, src) = (self.tex(target)?, self.tex(source)?);
                self.reg.channel_diff(dst, src, *channel, *mask)
            }
            Step::TextureDiff {
                target,
                source,
                mask,
            } => {
                let (dst, src) = (self.tex(target)?, self.tex(source)?);
                self.reg.texture_diff(dst, src, *mask)
            }
            Step::Merge {
                target,
                source,
                blend,
                mask,
            } => {
                let (dst, src) = (self.tex(target)?, self.tex(source)?);
                self.reg.merge(dst, src, *blend, *mask)
            }
            Step::BlendWithAlpha {
                target,
                source,
                alpha,
                channel,
                mask,
            } => {
                let (dst, src, a) = (self.tex(target)?, self.tex(source)?, self.tex(alpha)?);
                self.reg.blend_with_alpha(dst, src, a, *channel, *mask)
            }
            Step::Warp {
                target,
                map,
                mult,
                mask,
                into,
            } => {
                let m = self.tex(map)?;
                self.out_of_place(
                    target,
                    into.as_deref(),
                    |r, h| r.warp(h, m, *mult, *mask),
                    |r, h| r.warp_in_place(h, m, *mult, *mask),
                )
            }
            Step::Lens {
                target,
                source,
                mask,
                into,
            } => {
                let src = self.tex(source)?;
                self.out_of_place(
                    target,
                    into.as_deref(),
                    |r, h| r.apply_lens(h, src, *mask),
                    |r, h| r.apply_lens_in_place(h, src, *mask),
                )
            }
            Step::Shift {
                target,
                x,
                y,
                mask,
                into,
            } => self.out_of_place(
                target,
                into.as_deref(),
                |r, h| r.shift(h, *x, *y, *mask),
                |r, h| r.shift_in_place(h, *x, *y, *mask),
            ),
            Step::Blur {
                target,
                shape,
                factor,
                mask,
                into,
            } => self.out_of_place(
                target,
                into.as_deref(),
                |r, h| r.blur(h, *shape, *factor, *mask),
                |r, h| r.blur_in_place(h, *shape, *factor, *mask),
            ),
            Step::Turbulence {
                target,
                levels,
                persistence,
                mask,
                into,
            } => self.out_of_place(
                target,
                into.as_deref(),
                |r, h| r.turbulence(h, *levels, *persistence, *mask),
                |r, h| r.turbulence_in_place(h, *levels, *persistence, *mask),
            ),
            Step::Seed { device, seed } => {
                self.reg.seed_device(*device, *seed);
                Ok(())
            }
            Step::SeedText { device, text } => {
                self.reg.seed_device_str(*device, text);
                Ok(())
            }
            Step::Noise {
                target,
                device,
                mask,
            } => self.reg.noise(self.tex(target)?, *device, *mask),
            Step::WhiteNoise {
                target,
                device,
                mask,
            } => self.reg.white_noise(self.tex(target)?, *device, *mask),
            Step::NormalMap { target, mult } => self.reg.normal_map(self.tex(target)?, *mult),
            Step::MakePoints {
                name,
                device,
                count,
            } => {
                let set = self.reg.make_point_set(*device, *count)?;
                self.points
                    .insert(name.clone(), Points { set, field: None });
                Ok(())
            }
            Step::SpreadPoints {
                points,
                iterations,
                strength,
            } => {
                let entry = named_points(&mut self.points, points)?;
                self.reg
                    .spread_point_set(&mut entry.set, *iterations, *strength)?;
                entry.field = None;
                Ok(())
            }
            Step::Cellular {
                target,
                points,
                octaves,
                range,
            } => {
                let h = self.tex(target)?;
                let field = named_points(&mut self.points, points)?.field()?;
                self.reg.cellular(h, field, *octaves, *range)
            }
            Step::Delaunay {
                target,
                points,
                range,
                mask,
            } => {
                let h = self.tex(target)?;
                let field = named_points(&mut self.points, points)?.field()?;
                self.reg.delaunay(h, field, *range, *mask)
            }
            Step::Voronoi {
                target,
                points,
                range,
                mask,
            } => {
                let h = self.tex(target)?;
                let field = named_points(&mut self.points, points)?.field()?;
                self.reg.voronoi(h, field, *range, *mask)
            }
            Step::WriteBitmap { target, path } => {
                let path = self.resolve(path);
                if let Some(dir) = path.parent()
                    && !dir.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(dir).map_err(|e| TexError::io(dir, e))?;
                }
                self.reg.write_bitmap(self.tex(target)?, &path)?;
                tracing::info!(path = %path.display(), "bitmap written");
                self.written.push(path);
                Ok(())
            }
        }
    }
}

/// Execute `recipe` against `reg`. Relative paths resolve against `base_dir`.
///
/// Stops at the first failing step and returns its error. Textures created by earlier steps stay
/// registered.
#[tracing::instrument(skip(reg, recipe), fields(steps = recipe.steps.len()))]
pub fn run_recipe<B: ResourceBackend>(
    reg: &mut TextureRegistry<B>,
    recipe: &Recipe,
    base_dir: &Path,
) -> TexResult<RecipeOutcome> {
    let mut scope = Scope {
        reg,
        base_dir,
        textures: BTreeMap::new(),
        points: BTreeMap::new(),
        written: Vec::new(),
    };
    for (i, step) in recipe.steps.iter().enumerate() {
        tracing::debug!(index = i, ?step, "recipe step");
        if let Err(e) = scope.step(step) {
            tracing::warn!(index = i, error = %e, "recipe step failed");
            return Err(e);
        }
    }
    Ok(RecipeOutcome {
        textures: scope.textures,
        written: scope.written,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/recipe/runner.rs"]
mod tests;
