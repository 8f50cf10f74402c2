//! Director state persistence (§9 SUPPLEMENT).
//!
//! A `Director` is cheap to rebuild from a `StoryletLibrary` and a config, but
//! its `StateStore` and `TickHistory` are the irreplaceable run state. This
//! module wraps both in a versioned snapshot so a session can be saved and
//! restored across process restarts with identical future behavior, given the
//! same storylet library and config (§9 determinism guarantee).

use serde::{Deserialize, Serialize};

use narrator_core::StateStore;

use crate::history::TickHistory;

/// Current version of the director persistence format. Bump when
/// `DirectorSnapshot`'s shape changes in a way that breaks old saves.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// A complete, versioned snapshot of a `Director`'s run state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorSnapshot {
    /// The persistence format version this snapshot was written with.
    pub format_version: u32,
    /// The current world/character/relationship state.
    pub state: StateStore,
    /// The full tick history up to the point of the snapshot.
    pub history: TickHistory,
    /// The RNG seed the owning `Director` was configured with.
    pub rng_seed: u64,
}

impl DirectorSnapshot {
    /// Build a snapshot from the current state.
    pub fn new(state: StateStore, history: TickHistory, rng_seed: u64) -> Self {
        DirectorSnapshot {
            format_version: CURRENT_FORMAT_VERSION,
            state,
            history,
            rng_seed,
        }
    }
}
