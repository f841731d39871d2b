//! Convolution kernels.

/// Diffusion blur kernels.
pub mod blur;
