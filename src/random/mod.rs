//! Seeded randomness.

/// Named pseudo-random devices.
pub mod device;
/// Random point sets on the unit torus.
pub mod point_set;
