use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::export::{bmp, decode};
use crate::foundation::config::EngineConfig;
use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::{Channel, ChannelMask, Texel};
use crate::geometry::field::PointField;
use crate::memory::bucket::{BucketAllocator, BucketAllocatorOpts};
use crate::memory::buffer::PixelBuffer;
use crate::ops::blur::BlurShape;
use crate::ops::filter::{LinearRemap, PolyCoeffs};
use crate::ops::{basic, cellular, channel, filter, io, noise, normal, resample};
use crate::parallel::dispatch::Dispatcher;
use crate::random::device::RandomDevices;
use crate::random::point_set::PointSet;
use crate::registry::resource::{NoResources, ResourceBackend, ResourceId};

/// Opaque reference to a registered texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Default)]
struct Slot {
    buffer: Option<PixelBuffer>,
    resource: Option<ResourceId>,
}

/// Second operand sized to match the texture it is combined with.
enum Operand<'a> {
    Shared(&'a PixelBuffer),
    Transient(PixelBuffer),
}

impl Operand<'_> {
    fn get(&self) -> &PixelBuffer {
        match self {
            Self::Shared(b) => *b,
            Self::Transient(b) => b,
        }
    }
}

/// Handle table over pixel buffers, kept in step with an external rendering backend.
///
/// Every call validates its handles and parameters before any buffer is touched. Operands whose
/// size differs from the destination are resampled into a transient buffer that is never
/// registered. A handle bound to a backend resource (see [`TextureRegistry::resource_id`]) is
/// re-uploaded after every mutation.
pub struct TextureRegistry<B: ResourceBackend = NoResources> {
    alloc: Arc<BucketAllocator>,
    dispatcher: Dispatcher,
    backend: B,
    slots: Vec<Slot>,
    cursor: usize,
    live: usize,
    devices: RandomDevices,
}

impl<B: ResourceBackend> std::fmt::Debug for TextureRegistry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureRegistry")
            .field("slots", &self.slots.len())
            .field("live", &self.live)
            .field("threads", &self.dispatcher.threads())
            .finish_non_exhaustive()
    }
}

impl<B: ResourceBackend> TextureRegistry<B> {
    /// Build the allocator, worker pool and slot table described by `cfg`.
    pub fn new(cfg: &EngineConfig, backend: B) -> TexResult<Self> {
        cfg.validate()?;
        let alloc = Arc::new(BucketAllocator::new(BucketAllocatorOpts {
            capacity_scale: cfg.pool_capacity_scale,
        }));
        let dispatcher = Dispatcher::new(cfg.threads)?;
        let slots = (0..cfg.initial_slots).map(|_| Slot::default()).collect();
        Ok(Self {
            alloc,
            dispatcher,
            backend,
            slots,
            cursor: 0,
            live: 0,
            devices: RandomDevices::new(),
        })
    }

    /// Rendering backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable rendering backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Allocator backing every buffer.
    pub fn allocator(&self) -> &Arc<BucketAllocator> {
        &self.alloc
    }

    /// Worker pool.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Current slot table size.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.live
    }

    /// `true` when no texture is registered.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live handles in slot order.
    pub fn list(&self) -> Vec<TextureHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.buffer.is_some())
            .map(|(i, _)| TextureHandle(i as u32))
            .collect()
    }

    fn index(&self, h: TextureHandle) -> TexResult<usize> {
        let idx = h.0 as usize;
        match self.slots.get(idx) {
            Some(Slot {
                buffer: Some(_), ..
            }) => Ok(idx),
            _ => Err(TexError::InvalidHandle(h.0)),
        }
    }

    fn buffer(&self, h: TextureHandle) -> TexResult<&PixelBuffer> {
        self.slots
            .get(h.0 as usize)
            .and_then(|s| s.buffer.as_ref())
            .ok_or(TexError::InvalidHandle(h.0))
    }

    /// Borrow the buffer behind `h`.
    pub fn get(&self, h: TextureHandle) -> TexResult<&PixelBuffer> {
        self.buffer(h)
    }

    /// `(width, height)` of `h`.
    pub fn dimensions(&self, h: TextureHandle) -> TexResult<(u32, u32)> {
        Ok(self.buffer(h)?.dimensions())
    }

    fn insert(&mut self, buf: PixelBuffer) -> TextureHandle {
        let n = self.slots.len();
        let free = (0..n)
            .map(|i| (self.cursor + i) % n)
            .find(|i| self.slots[*i].buffer.is_none());
        let idx = match free {
            Some(i) => i,
            None => {
                self.slots.resize_with(n * 2, Slot::default);
                tracing::debug!(from = n, to = n * 2, "slot table grown");
                n
            }
        };
        self.slots[idx] = Slot {
            buffer: Some(buf),
            resource: None,
        };
        self.cursor = (idx + 1) % self.slots.len();
        self.live += 1;
        TextureHandle(idx as u32)
    }

    fn sync(&mut self, idx: usize) -> TexResult<()> {
        let slot = &self.slots[idx];
        if let (Some(id), Some(buf)) = (slot.resource, slot.buffer.as_ref()) {
            self.backend
                .upload(id, buf.texels(), buf.width(), buf.height())?;
        }
        Ok(())
    }

    fn substitute(&mut self, idx: usize, buf: PixelBuffer) -> TexResult<()> {
        let old = self.slots[idx]
            .buffer
            .replace(buf)
            .map(|b| b.dimensions());
        self.refresh(idx, old)
    }

    /// Push slot `idx` to its resource, rebinding first if the buffer no longer has the
    /// `old` dimensions.
    fn refresh(&mut self, idx: usize, old: Option<(u32, u32)>) -> TexResult<()> {
        let slot = &mut self.slots[idx];
        let dims = slot.buffer.as_ref().map(PixelBuffer::dimensions);
        if dims != old
            && let Some((w, h)) = dims
            && let Some(prev) = slot.resource.take()
        {
            self.backend.release(prev)?;
            let id = self.backend.create(w, h)?;
            slot.resource = Some(id);
            tracing::debug!(slot = idx, old = prev.0, new = id.0, "resource rebound");
        }
        self.sync(idx)
    }

    fn operand<'a>(&'a self, h: TextureHandle, like: (u32, u32)) -> TexResult<Operand<'a>> {
        let b = self.buffer(h)?;
        if b.dimensions() == like {
            return Ok(Operand::Shared(b));
        }
        tracing::debug!(
            handle = h.0,
            from = ?b.dimensions(),
            to = ?like,
            "resampling operand"
        );
        Ok(Operand::Transient(resample::resize(
            &self.dispatcher,
            b,
            like.0,
            like.1,
        )?))
    }

    fn mutate<F>(&mut self, h: TextureHandle, f: F) -> TexResult<()>
    where
        F: FnOnce(&Dispatcher, &mut PixelBuffer) -> TexResult<()>,
    {
        let idx = self.index(h)?;
        let buf = self.slots[idx]
            .buffer
            .as_mut()
            .ok_or(TexError::InvalidHandle(h.0))?;
        f(&self.dispatcher, buf)?;
        self.sync(idx)
    }

    /// Mutate `h` reading `srcs`; an operand is `None` when it is `h` itself.
    fn mutate_with<const N: usize, F>(
        &mut self,
        h: TextureHandle,
        srcs: [TextureHandle; N],
        f: F,
    ) -> TexResult<()>
    where
        F: FnOnce(&Dispatcher, &mut PixelBuffer, [Option<&PixelBuffer>; N]) -> TexResult<()>,
    {
        let di = self.index(h)?;
        let mut idx = [0usize; N];
        for (k, s) in srcs.iter().enumerate() {
            idx[k] = self.index(*s)?;
        }
        let like = self.buffer(h)?.dimensions();

        let mut transients: Vec<Option<PixelBuffer>> = Vec::with_capacity(N);
        for (k, s) in srcs.iter().enumerate() {
            let t = if idx[k] == di {
                None
            } else {
                match self.operand(*s, like)? {
                    Operand::Transient(b) => Some(b),
                    Operand::Shared(_) => None,
                }
            };
            transients.push(t);
        }

        let (left, rest) = self.slots.split_at_mut(di);
        let (dst_slot, right) = rest
            .split_first_mut()
            .ok_or(TexError::InvalidHandle(h.0))?;
        let dst = dst_slot
            .buffer
            .as_mut()
            .ok_or(TexError::InvalidHandle(h.0))?;
        let (left, right): (&[Slot], &[Slot]) = (left, right);
        let operands: [Option<&PixelBuffer>; N] = std::array::from_fn(|k| {
            let si = idx[k];
            if si == di {
                None
            } else if let Some(t) = transients[k].as_ref() {
                Some(t)
            } else if si < di {
                left[si].buffer.as_ref()
            } else {
                right[si - di - 1].buffer.as_ref()
            }
        });
        f(&self.dispatcher, dst, operands)?;
        self.sync(di)
    }

    /// Build a new buffer from `h` and operands resampled to its size.
    fn produce<const N: usize, F>(
        &self,
        h: TextureHandle,
        srcs: [TextureHandle; N],
        f: F,
    ) -> TexResult<PixelBuffer>
    where
        F: FnOnce(&Dispatcher, &PixelBuffer, [&PixelBuffer; N]) -> TexResult<PixelBuffer>,
    {
        let base = self.buffer(h)?;
        for s in &srcs {
            self.index(*s)?;
        }
        let mut ops = Vec::with_capacity(N);
        for s in srcs {
            ops.push(self.operand(s, base.dimensions())?);
        }
        let refs: [&PixelBuffer; N] = std::array::from_fn(|k| ops[k].get());
        f(&self.dispatcher, base, refs)
    }

    fn replace(&mut self, h: TextureHandle, buf: PixelBuffer) -> TexResult<()> {
        let idx = self.index(h)?;
        self.substitute(idx, buf)
    }

    // ---- lifecycle

    /// Register a zero-filled `width x height` texture.
    #[tracing::instrument(skip(self))]
    pub fn create(&mut self, width: u32, height: u32) -> TexResult<TextureHandle> {
        let buf = PixelBuffer::blank(&self.alloc, width, height)?;
        Ok(self.insert(buf))
    }

    /// Register a texture converted from interleaved 8-bit RGBA.
    #[tracing::instrument(skip(self, bytes))]
    pub fn add_rgba8(&mut self, width: u32, height: u32, bytes: &[u8]) -> TexResult<TextureHandle> {
        let buf = PixelBuffer::from_rgba8(&self.alloc, width, height, bytes)?;
        Ok(self.insert(buf))
    }

    /// Register a texture copied from interleaved `f32` RGBA.
    #[tracing::instrument(skip(self, values))]
    pub fn add_rgba_f32(
        &mut self,
        width: u32,
        height: u32,
        values: &[f32],
    ) -> TexResult<TextureHandle> {
        let buf = PixelBuffer::from_rgba_f32(&self.alloc, width, height, values)?;
        Ok(self.insert(buf))
    }

    /// Decode an image file and register it.
    #[tracing::instrument(skip(self))]
    pub fn load_image(&mut self, path: &Path) -> TexResult<TextureHandle> {
        let buf = decode::load_image(&self.alloc, path)?;
        Ok(self.insert(buf))
    }

    /// Register a deep copy of `h`. The copy is not bound to any resource.
    #[tracing::instrument(skip(self))]
    pub fn clone_texture(&mut self, h: TextureHandle) -> TexResult<TextureHandle> {
        let buf = self.buffer(h)?.duplicate()?;
        Ok(self.insert(buf))
    }

    /// Drop `h`, releasing its bound resource if any.
    pub fn destroy(&mut self, h: TextureHandle) -> TexResult<()> {
        let idx = self.index(h)?;
        let slot = &mut self.slots[idx];
        slot.buffer = None;
        self.live -= 1;
        if let Some(id) = slot.resource.take() {
            tracing::debug!(handle = h.0, resource = id.0, "resource released");
            self.backend.release(id)?;
        }
        Ok(())
    }

    /// Drop several handles; nothing is dropped unless every handle is valid and distinct.
    pub fn destroy_many(&mut self, handles: &[TextureHandle]) -> TexResult<()> {
        let mut seen = HashSet::with_capacity(handles.len());
        for h in handles {
            self.index(*h)?;
            if !seen.insert(*h) {
                return Err(TexError::validation(format!(
                    "handle {} listed twice",
                    h.0
                )));
            }
        }
        for h in handles {
            self.destroy(*h)?;
        }
        Ok(())
    }

    /// Resample `h` to `width x height` by power-of-two steps; equal dimensions are a no-op.
    #[tracing::instrument(skip(self))]
    pub fn resize(&mut self, h: TextureHandle, width: u32, height: u32) -> TexResult<()> {
        let src = self.buffer(h)?;
        if src.dimensions() == (width, height) {
            return Ok(());
        }
        let buf = resample::resize(&self.dispatcher, src, width, height)?;
        self.replace(h, buf)
    }

    // ---- raw access

    /// Overwrite `h` from interleaved 8-bit RGBA.
    pub fn write_rgba8(&mut self, h: TextureHandle, bytes: &[u8]) -> TexResult<()> {
        self.mutate(h, |d, b| io::write_rgba8(d, b, bytes))
    }

    /// Overwrite `h` from interleaved `f32` RGBA.
    pub fn write_rgba_f32(&mut self, h: TextureHandle, values: &[f32]) -> TexResult<()> {
        self.mutate(h, |d, b| io::write_rgba_f32(d, b, values))
    }

    /// Interleaved 8-bit RGBA of `h`.
    pub fn read_rgba8(&self, h: TextureHandle) -> TexResult<Vec<u8>> {
        io::read_rgba8(&self.dispatcher, self.buffer(h)?)
    }

    /// Interleaved `f32` RGBA of `h`.
    pub fn read_rgba_f32(&self, h: TextureHandle) -> TexResult<Vec<f32>> {
        Ok(io::read_rgba_f32(self.buffer(h)?))
    }

    /// Write one byte per texel into the masked channels of `h`.
    pub fn write_channel_u8(
        &mut self,
        h: TextureHandle,
        bytes: &[u8],
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate(h, |d, b| io::write_channel_u8(d, b, bytes, mask))
    }

    /// Write one float per texel into the masked channels of `h`.
    pub fn write_channel_f32(
        &mut self,
        h: TextureHandle,
        values: &[f32],
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate(h, |d, b| io::write_channel_f32(d, b, values, mask))
    }

    /// Channel `ch` of `h` as bytes.
    pub fn read_channel_u8(&self, h: TextureHandle, ch: Channel) -> TexResult<Vec<u8>> {
        io::read_channel_u8(&self.dispatcher, self.buffer(h)?, ch)
    }

    /// Channel `ch` of `h` as floats.
    pub fn read_channel_f32(&self, h: TextureHandle, ch: Channel) -> TexResult<Vec<f32>> {
        io::read_channel_f32(&self.dispatcher, self.buffer(h)?, ch)
    }

    // ---- external resources

    /// Resource bound to `h`, created on first request. The current contents are pushed on
    /// every call.
    pub fn resource_id(&mut self, h: TextureHandle) -> TexResult<ResourceId> {
        let idx = self.index(h)?;
        let id = match self.slots[idx].resource {
            Some(id) => id,
            None => {
                let (w, hh) = self.buffer(h)?.dimensions();
                let id = self.backend.create(w, hh)?;
                self.slots[idx].resource = Some(id);
                tracing::debug!(handle = h.0, resource = id.0, "resource bound");
                id
            }
        };
        self.sync(idx)?;
        Ok(id)
    }

    /// Unbind the slot holding `id` after the backend dropped it on its own. Returns whether a
    /// slot was bound to it.
    pub fn forget_resource(&mut self, id: ResourceId) -> bool {
        match self.slots.iter_mut().find(|s| s.resource == Some(id)) {
            Some(slot) => {
                slot.resource = None;
                true
            }
            None => false,
        }
    }

    /// Write `h` to `path` as a bitmap.
    pub fn write_bitmap(&self, h: TextureHandle, path: &Path) -> TexResult<()> {
        bmp::write_bmp(self.buffer(h)?, path)
    }

    // ---- fills and copies

    /// Copy the masked channels of `src` into `dst`.
    pub fn copy(&mut self, dst: TextureHandle, src: TextureHandle, mask: ChannelMask) -> TexResult<()> {
        self.mutate_with(dst, [src], |d, b, [s]| match s {
            Some(s) => basic::copy(d, b, s, mask),
            None => Ok(()),
        })
    }

    /// Set the masked channels of `h` to `color`.
    pub fn fill(&mut self, h: TextureHandle, color: Texel, mask: ChannelMask) -> TexResult<()> {
        self.mutate(h, |d, b| basic::fill(d, b, color, mask))
    }

    /// Blend `color` into `h` with a per-channel factor.
    pub fn fill_blended(
        &mut self,
        h: TextureHandle,
        color: Texel,
        blend: Texel,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate(h, |d, b| basic::fill_blended(d, b, color, blend, mask))
    }

    /// Composite `h` over a solid `color` using its own alpha.
    pub fn fill_background(&mut self, h: TextureHandle, color: Texel, mask: ChannelMask) -> TexResult<()> {
        self.mutate(h, |d, b| channel::fill_background(d, b, color, mask))
    }

    /// Paint `color` into `dst` with coverage from `src[ch]`.
    pub fn fill_with_channel(
        &mut self,
        dst: TextureHandle,
        src: TextureHandle,
        ch: Channel,
        color: Texel,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate_with(dst, [src], |d, b, [s]| {
            channel::fill_with_channel(d, b, s, ch, color, mask)
        })
    }

    /// Exchange the masked channels of two textures.
    ///
    /// With every channel selected the buffers trade places whole, so sizes may differ and each
    /// handle takes the other's dimensions. A partial mask needs equal sizes.
    pub fn swap(&mut self, a: TextureHandle, b: TextureHandle, mask: ChannelMask) -> TexResult<()> {
        let (ai, bi) = (self.index(a)?, self.index(b)?);
        if ai == bi {
            return Ok(());
        }
        let (pa, pb) = Self::pair_mut(&mut self.slots, ai, bi)?;
        if mask.is_all() {
            let dims = (pa.dimensions(), pb.dimensions());
            std::mem::swap(pa, pb);
            self.refresh(ai, Some(dims.0))?;
            return self.refresh(bi, Some(dims.1));
        }
        basic::swap_masked(&self.dispatcher, pa, pb, mask)?;
        self.sync(ai)?;
        self.sync(bi)
    }

    fn pair_mut(
        slots: &mut [Slot],
        ai: usize,
        bi: usize,
    ) -> TexResult<(&mut PixelBuffer, &mut PixelBuffer)> {
        let (lo, hi, flip) = if ai < bi { (ai, bi, false) } else { (bi, ai, true) };
        let (left, right) = slots.split_at_mut(hi);
        let first = left[lo]
            .buffer
            .as_mut()
            .ok_or(TexError::InvalidHandle(lo as u32))?;
        let second = right[0]
            .buffer
            .as_mut()
            .ok_or(TexError::InvalidHandle(hi as u32))?;
        Ok(if flip { (second, first) } else { (first, second) })
    }

    // ---- filters

    /// Clamp the masked channels of `h` into `[min, max]`.
    pub fn clamp(&mut self, h: TextureHandle, min: f32, max: f32, mask: ChannelMask) -> TexResult<()> {
        self.mutate(h, |d, b| filter::clamp(d, b, min, max, mask))
    }

    /// Apply the polynomial tone curve.
    pub fn poly(&mut self, h: TextureHandle, coeffs: PolyCoeffs, mask: ChannelMask) -> TexResult<()> {
        self.mutate(h, |d, b| filter::poly(d, b, coeffs, mask))
    }

    /// Apply a linear remap.
    pub fn remap(&mut self, h: TextureHandle, r: LinearRemap, mask: ChannelMask) -> TexResult<()> {
        self.mutate(h, |d, b| filter::remap(d, b, r, mask))
    }

    /// Threshold the masked channels at `cutoff`.
    pub fn stencil(
        &mut self,
        h: TextureHandle,
        cutoff: f32,
        rev: bool,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate(h, |d, b| filter::stencil(d, b, cutoff, rev, mask))
    }

    /// Quantize the masked channels to `levels` steps.
    pub fn posterize(&mut self, h: TextureHandle, levels: u32, mask: ChannelMask) -> TexResult<()> {
        self.mutate(h, |d, b| filter::posterize(d, b, levels, mask))
    }

    // ---- channel routing

    /// Write `src[ch]` into every masked channel of `dst`.
    pub fn copy_channel(
        &mut self,
        dst: TextureHandle,
        src: TextureHandle,
        ch: Channel,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate_with(dst, [src], |d, b, [s]| {
            channel::copy_channel(d, b, s, ch, mask)
        })
    }

    /// Exchange `a[a_ch]` with `b[b_ch]`. Both textures must have equal size.
    pub fn swap_channels(
        &mut self,
        a: TextureHandle,
        a_ch: Channel,
        b: TextureHandle,
        b_ch: Channel,
    ) -> TexResult<()> {
        let (ai, bi) = (self.index(a)?, self.index(b)?);
        if ai == bi {
            return self.mutate(a, |d, buf| channel::swap_channels_within(d, buf, a_ch, b_ch));
        }
        let (pa, pb) = Self::pair_mut(&mut self.slots, ai, bi)?;
        channel::swap_channels(&self.dispatcher, pa, a_ch, pb, b_ch)?;
        self.sync(ai)?;
        self.sync(bi)
    }

    /// `dst[c] = dst[c] * (1 - blend) + src[ch] * blend` for masked channels.
    pub fn blend_channels(
        &mut self,
        dst: TextureHandle,
        src: TextureHandle,
        ch: Channel,
        blend: f32,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate_with(dst, [src], |d, b, [s]| {
            channel::blend_channels(d, b, s, ch, blend, mask)
        })
    }

    /// `dst[c] = |dst[c] - src[ch]|` for masked channels.
    pub fn channel_diff(
        &mut self,
        dst: TextureHandle,
        src: TextureHandle,
        ch: Channel,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate_with(dst, [src], |d, b, [s]| {
            channel::channel_diff(d, b, s, ch, mask)
        })
    }

    /// `dst[c] = |dst[c] - src[c]|` for masked channels.
    pub fn texture_diff(
        &mut self,
        dst: TextureHandle,
        src: TextureHandle,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate_with(dst, [src], |d, b, [s]| channel::texture_diff(d, b, s, mask))
    }

    /// Blend `src` into `dst` by a constant factor.
    pub fn merge(
        &mut self,
        dst: TextureHandle,
        src: TextureHandle,
        blend: f32,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate_with(dst, [src], |d, b, [s]| channel::merge(d, b, s, blend, mask))
    }

    /// Blend `src` into `dst` with per-texel factor `alpha[ch]`.
    pub fn blend_with_alpha(
        &mut self,
        dst: TextureHandle,
        src: TextureHandle,
        alpha: TextureHandle,
        ch: Channel,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate_with(dst, [src, alpha], |d, b, [s, a]| {
            channel::blend_with_alpha(d, b, s, a, ch, mask)
        })
    }

    // ---- resampling

    /// New texture: `h` displaced by the red/green channels of `map`.
    pub fn warp(
        &mut self,
        h: TextureHandle,
        map: TextureHandle,
        mult: f32,
        mask: ChannelMask,
    ) -> TexResult<TextureHandle> {
        let buf = self.produce(h, [map], |d, src, [m]| resample::warp(d, src, m, mult, mask))?;
        Ok(self.insert(buf))
    }

    /// [`TextureRegistry::warp`] written back into `h`.
    pub fn warp_in_place(
        &mut self,
        h: TextureHandle,
        map: TextureHandle,
        mult: f32,
        mask: ChannelMask,
    ) -> TexResult<()> {
        let buf = self.produce(h, [map], |d, src, [m]| resample::warp(d, src, m, mult, mask))?;
        self.replace(h, buf)
    }

    fn lens(&self, map: TextureHandle, src: TextureHandle, mask: ChannelMask) -> TexResult<PixelBuffer> {
        let source = self.buffer(src)?;
        let mut out = self.buffer(map)?.duplicate()?;
        resample::sample_map(&self.dispatcher, &mut out, source, mask)?;
        Ok(out)
    }

    /// New texture the size of `map`, sampling `src` at the coordinates stored in `map`.
    pub fn apply_lens(
        &mut self,
        map: TextureHandle,
        src: TextureHandle,
        mask: ChannelMask,
    ) -> TexResult<TextureHandle> {
        let buf = self.lens(map, src, mask)?;
        Ok(self.insert(buf))
    }

    /// [`TextureRegistry::apply_lens`] written back into `map`.
    pub fn apply_lens_in_place(
        &mut self,
        map: TextureHandle,
        src: TextureHandle,
        mask: ChannelMask,
    ) -> TexResult<()> {
        let buf = self.lens(map, src, mask)?;
        self.replace(map, buf)
    }

    /// New texture: `h` rolled by fractions of its size.
    pub fn shift(
        &mut self,
        h: TextureHandle,
        x_shift: f32,
        y_shift: f32,
        mask: ChannelMask,
    ) -> TexResult<TextureHandle> {
        let buf = resample::shift(&self.dispatcher, self.buffer(h)?, x_shift, y_shift, mask)?;
        Ok(self.insert(buf))
    }

    /// [`TextureRegistry::shift`] written back into `h`.
    pub fn shift_in_place(
        &mut self,
        h: TextureHandle,
        x_shift: f32,
        y_shift: f32,
        mask: ChannelMask,
    ) -> TexResult<()> {
        let buf = resample::shift(&self.dispatcher, self.buffer(h)?, x_shift, y_shift, mask)?;
        self.replace(h, buf)
    }

    // ---- blur and noise

    /// New texture: `h` blurred with `shape`.
    pub fn blur(
        &mut self,
        h: TextureHandle,
        shape: BlurShape,
        factor: f32,
        mask: ChannelMask,
    ) -> TexResult<TextureHandle> {
        let buf = shape.run(&self.dispatcher, self.buffer(h)?, factor, mask)?;
        Ok(self.insert(buf))
    }

    /// [`TextureRegistry::blur`] written back into `h`.
    pub fn blur_in_place(
        &mut self,
        h: TextureHandle,
        shape: BlurShape,
        factor: f32,
        mask: ChannelMask,
    ) -> TexResult<()> {
        let buf = shape.run(&self.dispatcher, self.buffer(h)?, factor, mask)?;
        self.replace(h, buf)
    }

    /// New texture: weighted box-filtered octaves of `h`.
    pub fn turbulence(
        &mut self,
        h: TextureHandle,
        levels: u32,
        persistence: f32,
        mask: ChannelMask,
    ) -> TexResult<TextureHandle> {
        let buf = noise::turbulence(&self.dispatcher, self.buffer(h)?, levels, persistence, mask)?;
        Ok(self.insert(buf))
    }

    /// [`TextureRegistry::turbulence`] written back into `h`.
    pub fn turbulence_in_place(
        &mut self,
        h: TextureHandle,
        levels: u32,
        persistence: f32,
        mask: ChannelMask,
    ) -> TexResult<()> {
        let buf = noise::turbulence(&self.dispatcher, self.buffer(h)?, levels, persistence, mask)?;
        self.replace(h, buf)
    }

    /// Seed random device `dev`.
    pub fn seed_device(&mut self, dev: u32, seed: u64) {
        self.devices.seed(dev, seed);
    }

    /// Seed random device `dev` from text.
    pub fn seed_device_str(&mut self, dev: u32, text: &str) {
        self.devices.seed_str(dev, text);
    }

    /// Fill each masked channel of `h` with its own draw from device `dev`.
    pub fn noise(&mut self, h: TextureHandle, dev: u32, mask: ChannelMask) -> TexResult<()> {
        let idx = self.index(h)?;
        let device = self.devices.get_mut(dev)?;
        let buf = self.slots[idx]
            .buffer
            .as_mut()
            .ok_or(TexError::InvalidHandle(h.0))?;
        noise::noise(&self.dispatcher, buf, device, mask)?;
        self.sync(idx)
    }

    /// Fill the masked channels of `h` with one shared draw per texel from device `dev`.
    pub fn white_noise(&mut self, h: TextureHandle, dev: u32, mask: ChannelMask) -> TexResult<()> {
        let idx = self.index(h)?;
        let device = self.devices.get_mut(dev)?;
        let buf = self.slots[idx]
            .buffer
            .as_mut()
            .ok_or(TexError::InvalidHandle(h.0))?;
        noise::white_noise(&self.dispatcher, buf, device, mask)?;
        self.sync(idx)
    }

    /// Replace R, G, B of `h` with the normal map of its alpha height field.
    pub fn normal_map(&mut self, h: TextureHandle, mult: f32) -> TexResult<()> {
        self.mutate(h, |d, b| normal::normal_map(d, b, mult))
    }

    // ---- point fields

    /// Draw a point set from device `dev`.
    pub fn make_point_set(&mut self, dev: u32, count: usize) -> TexResult<PointSet> {
        PointSet::make(self.devices.get_mut(dev)?, count)
    }

    /// Relax `set` on the torus.
    pub fn spread_point_set(&self, set: &mut PointSet, iterations: u32, strength: f64) -> TexResult<()> {
        set.spread(iterations, strength)
    }

    /// Per channel, the scaled distance to the `octaves[c]`-th nearest point.
    pub fn cellular(
        &mut self,
        h: TextureHandle,
        field: &dyn PointField,
        octaves: [u8; 4],
        range: f32,
    ) -> TexResult<()> {
        self.mutate(h, |d, b| cellular::cellular(d, b, field, octaves, range))
    }

    /// Scaled distance to the nearest Delaunay edge.
    pub fn delaunay(
        &mut self,
        h: TextureHandle,
        field: &dyn PointField,
        range: f32,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate(h, |d, b| cellular::delaunay(d, b, field, range, mask))
    }

    /// Scaled distance to the nearest Voronoi edge.
    pub fn voronoi(
        &mut self,
        h: TextureHandle,
        field: &dyn PointField,
        range: f32,
        mask: ChannelMask,
    ) -> TexResult<()> {
        self.mutate(h, |d, b| cellular::voronoi(d, b, field, range, mask))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/manager.rs"]
mod tests;
