//! Core configuration for scenewire-animation-core.

use serde::{Deserialize, Serialize};

/// Configuration for engine sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity hint for clip and player storage.
    pub initial_players: usize,

    /// Maximum events retained per tick; later events in the same tick are
    /// dropped with a warning.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_players: 16,
            max_events_per_tick: 1024,
        }
    }
}
