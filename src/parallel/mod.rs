//! Range partitioning over the worker pool.

/// Persistent pool and the partitioning contract.
pub mod dispatch;
/// Const-generic mask and channel specialization.
pub mod specialize;
