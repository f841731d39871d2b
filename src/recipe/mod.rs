//! JSON recipes: ordered registry operations over named textures.
//!
//! ```json
//! { "steps": [
//!     { "op": "create", "name": "base", "width": 64, "height": 64 },
//!     { "op": "seed", "device": 1, "seed": 7 },
//!     { "op": "noise", "target": "base", "device": 1 },
//!     { "op": "blur", "target": "base", "shape": { "kind": "square", "level": 2 } },
//!     { "op": "write_bitmap", "target": "base", "path": "base.bmp" }
//! ] }
//! ```

/// Execution against a registry.
pub mod runner;
/// Serialized step types.
pub mod step;

pub use runner::{RecipeOutcome, run_recipe};
pub use step::{Recipe, Step};
