use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::foundation::error::{TexError, TexResult};

/// Largest value a device draws.
pub const DEVICE_MAX: u32 = u32::MAX;

/// One deterministic pseudo-random stream.
#[derive(Debug, Clone)]
pub struct RandomDevice {
    rng: StdRng,
}

impl RandomDevice {
    /// Device seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Raw draw in `0..=DEVICE_MAX`.
    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Draw divided by [`DEVICE_MAX`], in `[0, 1]`.
    pub fn next_unit(&mut self) -> f32 {
        (f64::from(self.next_u32()) / f64::from(DEVICE_MAX)) as f32
    }
}

/// Named devices. A device exists once it has been seeded.
#[derive(Debug, Default)]
pub struct RandomDevices {
    devices: HashMap<u32, RandomDevice>,
}

impl RandomDevices {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)seed device `dev`.
    pub fn seed(&mut self, dev: u32, seed: u64) {
        tracing::debug!(dev, seed, "seed random device");
        self.devices.insert(dev, RandomDevice::seeded(seed));
    }

    /// Seed device `dev` from text; equal strings give equal streams.
    pub fn seed_str(&mut self, dev: u32, text: &str) {
        self.seed(dev, fnv1a64(text.as_bytes()));
    }

    /// Mutable access to a seeded device.
    pub fn get_mut(&mut self, dev: u32) -> TexResult<&mut RandomDevice> {
        self.devices
            .get_mut(&dev)
            .ok_or_else(|| TexError::validation(format!("random device {dev} has not been seeded")))
    }

    /// Whether `dev` has been seeded.
    pub fn is_seeded(&self, dev: u32) -> bool {
        self.devices.contains_key(&dev)
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

#[cfg(test)]
#[path = "../../tests/unit/random/device.rs"]
mod tests;
