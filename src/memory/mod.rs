//! Bucketed texel storage.

/// Fixed-geometry slab buckets.
pub mod bucket;
/// Pooled RGBA float buffers.
pub mod buffer;
