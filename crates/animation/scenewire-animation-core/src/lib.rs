//! scenewire animation core (engine-agnostic)
//!
//! Clips hold tracks of keypoints stamped in seconds. Players advance clip
//! time under a loop mode and emit per-tick value changes keyed by the
//! track's target string, plus semantic events (started, paused, ended).

pub mod config;
pub mod data;
pub mod engine;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod outputs;
pub mod sampling;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use data::{Clip, Keypoint, Track};
pub use engine::{Engine, Player, PlayerState};
pub use ids::{AnimId, PlayerId};
pub use inputs::{Inputs, LoopMode, PlayerCommand};
pub use outputs::{Change, CoreEvent, Outputs};
pub use sampling::sample_track;
pub use scenewire_api_core::{Value, ValueKind};
