//! Reading and writing image files.

/// Bitmap export.
pub mod bmp;
/// Image decoding.
pub mod decode;
