//! Error taxonomy, texel types and engine configuration.

/// Engine-wide settings.
pub mod config;
/// Error type and result alias.
pub mod error;
/// Texels, channel selectors and write masks.
pub mod texel;
