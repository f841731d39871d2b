//! Handle table over pixel buffers and its external resource seam.

/// The texture registry.
pub mod manager;
/// External rendering resources bound to textures.
pub mod resource;
