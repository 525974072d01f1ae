//! Output contracts from the engine.
//!
//! Outputs carry the value changes for this tick keyed by the track's target
//! string, and a separate list of semantic events.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;
use scenewire_api_core::Value;

/// One changed target value for a given player this tick.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Change {
    pub player: PlayerId,
    pub key: String,
    pub value: Value,
}

/// Discrete signals emitted during stepping.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum CoreEvent {
    PlaybackStarted { player: PlayerId, clip: String },
    PlaybackPaused { player: PlayerId },
    /// A `Once` player reached the end of its clip.
    PlaybackEnded { player: PlayerId, clip_time: f32 },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    pub changes: Vec<Change>,
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn push_event(&mut self, ev: CoreEvent) {
        self.events.push(ev);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}
