use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{TexError, TexResult};
use crate::memory::bucket::BucketAllocator;
use crate::memory::buffer::PixelBuffer;

/// Decode an encoded image (any format the `image` crate reads) into a buffer.
pub fn decode_image(alloc: &Arc<BucketAllocator>, bytes: &[u8]) -> TexResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::from_rgba8(alloc, width, height, rgba.as_raw())
}

/// Read and decode the image at `path`.
pub fn load_image(alloc: &Arc<BucketAllocator>, path: &Path) -> TexResult<PixelBuffer> {
    let bytes = std::fs::read(path).map_err(|e| TexError::io(path, e))?;
    decode_image(alloc, &bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/export/decode.rs"]
mod tests;
