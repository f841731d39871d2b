use std::path::Path;

use crate::foundation::error::{TexError, TexResult};
use crate::memory::buffer::PixelBuffer;

/// Size of the file header plus the info header.
pub const HEADER_BYTES: usize = 54;
const INFO_HEADER_BYTES: u32 = 40;
const RESOLUTION: u32 = 1000;

/// Encode `buf` as a 32-bit uncompressed bitmap.
///
/// Rows are stored bottom row first, texels as R, G, B, A bytes, each channel clamped to
/// `[0, 1]` independently and truncated after scaling by 255.
pub fn encode_bmp(buf: &PixelBuffer) -> TexResult<Vec<u8>> {
    let (w, h) = buf.dimensions();
    let image_bytes = (w as usize)
        .checked_mul(h as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| TexError::validation("bitmap size overflow"))?;
    let file_bytes = u32::try_from(HEADER_BYTES + image_bytes)
        .map_err(|_| TexError::validation("bitmap exceeds 4 GiB"))?;

    let mut out = Vec::with_capacity(HEADER_BYTES + image_bytes);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_bytes.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(HEADER_BYTES as u32).to_le_bytes());

    out.extend_from_slice(&INFO_HEADER_BYTES.to_le_bytes());
    out.extend_from_slice(&(w as i32).to_le_bytes());
    out.extend_from_slice(&(h as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&32u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(image_bytes as u32).to_le_bytes());
    out.extend_from_slice(&RESOLUTION.to_le_bytes());
    out.extend_from_slice(&RESOLUTION.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    debug_assert_eq!(out.len(), HEADER_BYTES);

    for row in buf.texels().chunks_exact(w as usize).rev() {
        for t in row {
            for c in 0..4 {
                out.push((t.0[c].clamp(0.0, 1.0) * 255.0) as u8);
            }
        }
    }
    Ok(out)
}

/// Encode `buf` and write it to `path`.
pub fn write_bmp(buf: &PixelBuffer, path: &Path) -> TexResult<()> {
    let bytes = encode_bmp(buf)?;
    std::fs::write(path, bytes).map_err(|e| TexError::io(path, e))
}

#[cfg(test)]
#[path = "../../tests/unit/export/bmp.rs"]
mod tests;
