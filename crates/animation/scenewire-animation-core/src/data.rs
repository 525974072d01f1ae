//! Clip data model: tracks of keypoints stamped in seconds.

use serde::{Deserialize, Serialize};

use crate::ids::AnimId;
use scenewire_api_core::Value;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keypoint {
    /// Clip-local time in seconds.
    pub time: f32,
    pub value: Value,
}

impl Keypoint {
    pub fn new(time: f32, value: Value) -> Self {
        Self { time, value }
    }
}

/// A track writing one target key (e.g. "Door.translation").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub target: String,
    pub points: Vec<Keypoint>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    #[serde(skip)]
    pub id: Option<AnimId>,
    pub name: String,
    pub tracks: Vec<Track>,
    /// Duration in seconds.
    pub duration: f32,
}

impl Clip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            id: None,
            name: name.into(),
            tracks: Vec::new(),
            duration,
        }
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Validate basic invariants: positive duration, finite non-decreasing
    /// key times inside [0, duration].
    pub fn validate_basic(&self) -> Result<(), String> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(format!("clip '{}' duration must be > 0", self.name));
        }
        for track in &self.tracks {
            let mut last = -f32::INFINITY;
            for p in &track.points {
                if !p.time.is_finite() || p.time < 0.0 || p.time > self.duration + 1e-4 {
                    return Err(format!(
                        "keypoint time {} outside [0, {}] for '{}'",
                        p.time, self.duration, track.target
                    ));
                }
                if p.time < last {
                    return Err(format!(
                        "keypoint times must be non-decreasing for '{}'",
                        track.target
                    ));
                }
                last = p.time;
            }
        }
        Ok(())
    }
}
