//! narrator_core: Foundation types, RNG, and world-state model for the World Director.
//!
//! This crate provides:
//! - The scalar value model shared by conditions, effects, and diffs
//! - Dotted-path addressing into world/character/relationship state
//! - The `StateStore` snapshot and its deep-clone/get semantics
//! - Seeded, domain-separated deterministic RNG

pub mod errors;
pub mod ids;
pub mod path;
pub mod rng;
pub mod state;
pub mod value;

pub use errors::*;
pub use ids::*;
pub use path::*;
pub use rng::*;
pub use state::*;
pub use value::*;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
