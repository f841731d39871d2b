use std::sync::Arc;

use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::Texel;
use crate::memory::bucket::{BucketAllocator, TexelBlock, magnitude};

/// Fixed-size RGBA `f32` buffer stored in a block drawn from a [`BucketAllocator`].
///
/// Dimensions never change after creation; resizing produces a new buffer. Dropping the buffer
/// returns its block to the bucket it came from.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    magnitude: u32,
    texels: Vec<Texel>,
    alloc: Arc<BucketAllocator>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("magnitude", &self.magnitude)
            .finish_non_exhaustive()
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        let block = TexelBlock {
            magnitude: self.magnitude,
            texels: std::mem::take(&mut self.texels),
        };
        self.alloc.deallocate(block);
    }
}

impl PixelBuffer {
    fn with_block(alloc: &Arc<BucketAllocator>, width: u32, height: u32) -> TexResult<Self> {
        let magnitude = magnitude(width, height)?;
        let block = alloc.allocate(magnitude)?;
        Ok(Self {
            width,
            height,
            magnitude,
            texels: block.texels,
            alloc: Arc::clone(alloc),
        })
    }

    /// Zero-filled buffer.
    pub fn blank(alloc: &Arc<BucketAllocator>, width: u32, height: u32) -> TexResult<Self> {
        let mut buf = Self::with_block(alloc, width, height)?;
        let n = buf.pixel_count();
        buf.texels.resize(n, Texel::ZERO);
        Ok(buf)
    }

    /// Buffer converted from interleaved 8-bit RGBA (each channel divided by 255).
    pub fn from_rgba8(
        alloc: &Arc<BucketAllocator>,
        width: u32,
        height: u32,
        src: &[u8],
    ) -> TexResult<Self> {
        let mut buf = Self::with_block(alloc, width, height)?;
        let n = buf.pixel_count();
        check_source_len(src.len(), n)?;
        buf.texels.extend(src[..n * 4].chunks_exact(4).map(|px| {
            Texel::new(
                f32::from(px[0]) / 255.0,
                f32::from(px[1]) / 255.0,
                f32::from(px[2]) / 255.0,
                f32::from(px[3]) / 255.0,
            )
        }));
        Ok(buf)
    }

    /// Buffer copied from interleaved `f32` RGBA.
    pub fn from_rgba_f32(
        alloc: &Arc<BucketAllocator>,
        width: u32,
        height: u32,
        src: &[f32],
    ) -> TexResult<Self> {
        let mut buf = Self::with_block(alloc, width, height)?;
        let n = buf.pixel_count();
        check_source_len(src.len(), n)?;
        buf.texels
            .extend(src[..n * 4].chunks_exact(4).map(|px| Texel::new(px[0], px[1], px[2], px[3])));
        Ok(buf)
    }

    /// Deep copy drawn from the same allocator.
    pub fn duplicate(&self) -> TexResult<Self> {
        let mut buf = Self::with_block(&self.alloc, self.width, self.height)?;
        buf.texels.extend_from_slice(&self.texels);
        Ok(buf)
    }

    /// Blank buffer of a different size drawn from the same allocator.
    pub fn sibling(&self, width: u32, height: u32) -> TexResult<Self> {
        Self::blank(&self.alloc, width, height)
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Allocator bucket index.
    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// Number of texels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether `other` has identical dimensions.
    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Row-major texels.
    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    /// Mutable row-major texels.
    pub fn texels_mut(&mut self) -> &mut [Texel] {
        &mut self.texels
    }

    /// Texel at `(x, y)`; coordinates must be in range.
    pub fn get(&self, x: u32, y: u32) -> Texel {
        self.texels[x as usize + y as usize * self.width as usize]
    }

    /// Texel at `(x, y)` with both coordinates wrapped onto the buffer (tileable read).
    pub fn get_wrapped(&self, x: i64, y: i64) -> Texel {
        let xw = x.rem_euclid(i64::from(self.width)) as usize;
        let yw = y.rem_euclid(i64::from(self.height)) as usize;
        self.texels[xw + yw * self.width as usize]
    }

    /// Owning allocator.
    pub fn allocator(&self) -> &Arc<BucketAllocator> {
        &self.alloc
    }
}

fn check_source_len(len: usize, pixels: usize) -> TexResult<()> {
    if len < pixels * 4 {
        return Err(TexError::validation(format!(
            "source holds {len} elements, expected at least {}",
            pixels * 4
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/memory/buffer.rs"]
mod tests;
