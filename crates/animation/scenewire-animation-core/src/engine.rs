//! Playback engine: clips, one-clip players, fixed-step updates.

use log::{debug, warn};

use crate::config::Config;
use crate::data::Clip;
use crate::ids::{AnimId, PlayerId};
use crate::inputs::{Inputs, LoopMode, PlayerCommand};
use crate::outputs::{Change, CoreEvent, Outputs};
use crate::sampling::sample_track;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Playing,
    Paused,
    /// A `Once` player that reached the end; holds the final pose.
    Ended,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub clip: AnimId,
    pub time: f32,
    pub mode: LoopMode,
    pub state: PlayerState,
}

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    clips: Vec<(AnimId, Clip)>,
    players: Vec<Player>,
    outputs: Outputs,
}

fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if m < 0.0 {
        m + b
    } else {
        m
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            players: Vec::with_capacity(cfg.initial_players),
            clips: Vec::with_capacity(cfg.initial_players),
            cfg,
            outputs: Outputs::default(),
        }
    }

    /// Load a clip, returning its id. Invalid clips are kept but logged; their
    /// samples hold whatever the keypoints give.
    pub fn load_clip(&mut self, mut clip: Clip) -> AnimId {
        if let Err(e) = clip.validate_basic() {
            warn!("loading clip with invalid data: {e}");
        }
        let id = AnimId::at(self.clips.len());
        clip.id = Some(id);
        self.clips.push((id, clip));
        id
    }

    pub fn clip(&self, id: AnimId) -> Option<&Clip> {
        self.clips.iter().find(|(cid, _)| *cid == id).map(|(_, c)| c)
    }

    /// Create a stopped player bound to `clip`.
    pub fn create_player(&mut self, name: &str, clip: AnimId, mode: LoopMode) -> PlayerId {
        let id = PlayerId::at(self.players.len());
        self.players.push(Player {
            id,
            name: name.to_string(),
            clip,
            time: 0.0,
            mode,
            state: PlayerState::Stopped,
        });
        id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_playing(&self, id: PlayerId) -> bool {
        self.player(id)
            .is_some_and(|p| p.state == PlayerState::Playing)
    }

    fn emit(outputs: &mut Outputs, cap: usize, ev: CoreEvent) {
        if outputs.events.len() >= cap {
            warn!("dropping animation event over per-tick cap: {ev:?}");
            return;
        }
        outputs.push_event(ev);
    }

    fn apply_inputs(&mut self, inputs: Inputs) {
        let cap = self.cfg.max_events_per_tick;
        for cmd in inputs.player_cmds {
            let pid = match &cmd {
                PlayerCommand::Play { player } | PlayerCommand::Pause { player } => *player,
            };
            let Some(p) = self.players.iter_mut().find(|p| p.id == pid) else {
                warn!("command for unknown player {pid:?}");
                continue;
            };
            match cmd {
                PlayerCommand::Play { .. } => {
                    if p.state != PlayerState::Paused {
                        p.time = 0.0;
                    }
                    p.state = PlayerState::Playing;
                    let clip = self
                        .clips
                        .iter()
                        .find(|(cid, _)| *cid == p.clip)
                        .map(|(_, c)| c.name.clone())
                        .unwrap_or_default();
                    debug!("player '{}' started", p.name);
                    Self::emit(
                        &mut self.outputs,
                        cap,
                        CoreEvent::PlaybackStarted { player: pid, clip },
                    );
                }
                PlayerCommand::Pause { .. } => {
                    if p.state == PlayerState::Playing {
                        p.state = PlayerState::Paused;
                        let ev = CoreEvent::PlaybackPaused { player: pid };
                        Self::emit(&mut self.outputs, cap, ev);
                    }
                }
            }
        }
    }

    /// Step by `dt` seconds. Playing players advance and emit one change per
    /// non-empty track; a `Once` player that reaches the end emits its final
    /// values and `PlaybackEnded`, then goes quiet.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        self.apply_inputs(inputs);
        let cap = self.cfg.max_events_per_tick;

        for p in &mut self.players {
            if p.state != PlayerState::Playing {
                continue;
            }
            let Some((_, clip)) = self.clips.iter().find(|(cid, _)| *cid == p.clip) else {
                continue;
            };
            let duration = clip.duration.max(0.0);
            p.time += dt.max(0.0);
            let mut ended = false;
            let local = match p.mode {
                LoopMode::Loop => fmod(p.time, duration),
                LoopMode::Once => {
                    if p.time >= duration {
                        p.time = duration;
                        ended = true;
                    }
                    p.time
                }
            };
            for track in &clip.tracks {
                if let Some(value) = sample_track(track, local) {
                    self.outputs.push_change(Change {
                        player: p.id,
                        key: track.target.clone(),
                        value,
                    });
                }
            }
            if ended {
                p.state = PlayerState::Ended;
                debug!("player '{}' ended", p.name);
                Self::emit(
                    &mut self.outputs,
                    cap,
                    CoreEvent::PlaybackEnded {
                        player: p.id,
                        clip_time: duration,
                    },
                );
            }
        }

        &self.outputs
    }
}
