//! Input contracts for the engine: per-player commands applied before a tick.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    #[serde(default)]
    pub player_cmds: Vec<PlayerCommand>,
}

impl Inputs {
    pub fn with(cmd: PlayerCommand) -> Self {
        Self {
            player_cmds: vec![cmd],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum PlayerCommand {
    /// Start from the beginning, or resume when paused mid-clip.
    Play { player: PlayerId },
    Pause { player: PlayerId },
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LoopMode {
    #[default]
    Once,
    Loop,
}
