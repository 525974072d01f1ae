//! Frame-clock task registry.
//!
//! Tasks run every tick in registration order until unregistered.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use scenewire_animation_core::PlayerId;

use crate::registry::{ScriptId, TriggerId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameTask {
    /// A running keyframe player.
    Animation(PlayerId),
    /// The drag session armed by this trigger.
    Drag(TriggerId),
    /// A per-frame script.
    Script(ScriptId),
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    tasks: IndexSet<FrameTask>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the task was already registered.
    pub fn register(&mut self, task: FrameTask) -> bool {
        self.tasks.insert(task)
    }

    pub fn unregister(&mut self, task: FrameTask) -> bool {
        self.tasks.shift_remove(&task)
    }

    pub fn contains(&self, task: FrameTask) -> bool {
        self.tasks.contains(&task)
    }

    pub fn iter(&self) -> impl Iterator<Item = FrameTask> + '_ {
        self.tasks.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
