use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{TexError, TexResult};

/// Engine-wide settings fixed at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker count for the dispatcher. `None` uses the machine's available parallelism.
    pub threads: Option<usize>,
    /// Registry slot table size before the first doubling.
    pub initial_slots: usize,
    /// Multiplier applied to every allocator bucket's capacity.
    pub pool_capacity_scale: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: None,
            initial_slots: 16,
            pool_capacity_scale: 1,
        }
    }
}

impl EngineConfig {
    /// Check the values that cannot be expressed by the types alone.
    pub fn validate(&self) -> TexResult<()> {
        if self.threads == Some(0) {
            return Err(TexError::validation("config 'threads' must be >= 1 when set"));
        }
        if self.initial_slots == 0 {
            return Err(TexError::validation("config 'initial_slots' must be >= 1"));
        }
        if self.pool_capacity_scale == 0 {
            return Err(TexError::validation(
                "config 'pool_capacity_scale' must be >= 1",
            ));
        }
        Ok(())
    }

    /// Parse a JSON config document.
    pub fn from_json_str(s: &str) -> TexResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse engine config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> TexResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TexError::io(path, e))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
