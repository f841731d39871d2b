//! proctex is a procedural texture compute engine.
//!
//! Textures are dense RGBA `f32` buffers drawn from a bucketed allocator and addressed through
//! integer handles. Every operation runs on a persistent worker pool, with kernels specialized
//! per channel mask at compile time. The surface is registry-oriented:
//!
//! - Build a [`TextureRegistry`] from an [`EngineConfig`]
//! - Create, load or upload textures and combine them with the operation catalog
//! - Bind textures to an external [`ResourceBackend`] that receives every mutation
//! - Or describe the whole pipeline as a JSON [`Recipe`] and run it
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Errors, texels and configuration.
pub mod foundation;
/// Bitmap export and image decoding.
pub mod export;
/// Tileable point fields and triangulation.
pub mod geometry;
/// Blur kernels.
pub mod kernel;
/// Allocator and pixel buffers.
pub mod memory;
/// The operation catalog.
pub mod ops;
/// Worker pool and kernel specialization.
pub mod parallel;
/// Seeded devices and point sets.
pub mod random;
/// JSON recipes.
pub mod recipe;
/// Texture handles and external resources.
pub mod registry;

pub use crate::foundation::config::EngineConfig;
pub use crate::foundation::error::{TexError, TexResult};
pub use crate::foundation::texel::{Channel, ChannelMask, Texel};

pub use crate::geometry::field::{DelaunayField, PointField};
pub use crate::memory::bucket::{BucketAllocator, BucketAllocatorOpts, BucketStats};
pub use crate::memory::buffer::PixelBuffer;
pub use crate::ops::blur::BlurShape;
pub use crate::ops::filter::{LinearRemap, PolyCoeffs, RemapEdge};
pub use crate::parallel::dispatch::Dispatcher;
pub use crate::random::point_set::PointSet;
pub use crate::recipe::{Recipe, RecipeOutcome, Step, run_recipe};
pub use crate::registry::manager::{TextureHandle, TextureRegistry};
pub use crate::registry::resource::{
    InMemoryResources, NoResources, ResourceBackend, ResourceId, StoredResource,
};
