//! One-shot compilation of interactive objects into runtime reactions.

use indexmap::IndexMap;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use scenewire_animation_core::{Clip, Keypoint, LoopMode, PlayerCommand, PlayerId, Track};
use scenewire_api_core::{props, AxisAngle, SceneHost, ScriptRuntime, Value};

use crate::classify::{classify, BehaviorKind, BridgeKind, ScriptMode};
use crate::decl::{sanitize_interval, Declarations, InterpolatorKind};
use crate::edge::EdgeField;
use crate::fields::Property;
use crate::object::{InteractiveObject, ObjectId};
use crate::registry::{ItemId, ScriptId, ToggleId, TriggerId};
use crate::scheduler::FrameTask;
use crate::{script, Interactivity};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ReactionKind {
    Animate { binding: usize },
    FlipToggle { object: ObjectId, propagate: bool },
    InvokeScript { object: ObjectId },
    Bridge { object: ObjectId },
    Drag { object: ObjectId },
    Anchor { object: ObjectId },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Reaction {
    pub kind: ReactionKind,
    pub edge: EdgeField,
}

/// A keyframe player writing one item field.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AnimationBinding {
    pub object: ObjectId,
    pub player: PlayerId,
    pub item: ItemId,
    pub field: String,
    /// Single in-flight run guard, cleared once the player stops playing.
    pub running: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Compiled {
    pub reactions: IndexMap<TriggerId, Vec<Reaction>>,
    pub animations: Vec<AnimationBinding>,
    pub toggle_scripts: IndexMap<ToggleId, Vec<ScriptId>>,
}

impl Compiled {
    fn react(&mut self, trigger: TriggerId, kind: ReactionKind, edge: EdgeField) {
        self.reactions
            .entry(trigger)
            .or_default()
            .push(Reaction { kind, edge });
    }

    pub fn animation_for(&self, player: PlayerId) -> Option<usize> {
        self.animations.iter().position(|a| a.player == player)
    }
}

/// Summary of a compile pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileReport {
    pub behaviors: Vec<(ObjectId, BehaviorKind)>,
    /// Records that matched no behavior.
    pub skipped: Vec<ObjectId>,
    pub collider_owners: Vec<String>,
    /// Scripts that failed to load.
    pub script_failures: Vec<String>,
}

impl CompileReport {
    pub fn behavior(&self, object: ObjectId) -> Option<BehaviorKind> {
        self.behaviors
            .iter()
            .find(|(o, _)| *o == object)
            .map(|(_, b)| *b)
    }
}

fn keyframe_value(kind: InterpolatorKind, frame: &[f32]) -> Value {
    match kind {
        InterpolatorKind::Position => Value::Vec3([frame[0], frame[1], frame[2]]),
        InterpolatorKind::Orientation => Value::Quat(
            AxisAngle::from_xyza([frame[0], frame[1], frame[2], frame[3]]).to_quat(),
        ),
    }
}

/// Build the clip of a keyframe record. Keys are scaled by the timer's
/// cycle interval; the track writes the canonical channel name.
pub(crate) fn build_clip(obj: &InteractiveObject, decls: &Declarations) -> Option<(Clip, bool)> {
    let timer = decls.timers.get(obj.timer?)?;
    let interp = decls.interpolators.get(obj.interpolator?)?;
    let item = decls.items.get(obj.target?)?;
    let field = obj.to_target_field.as_deref().unwrap_or_default();

    let channel = match Property::from_field(field) {
        Some(p) if p.is_channel() => p,
        _ => {
            error!(
                "interpolator '{}' drives unsupported field '{}.{field}'",
                interp.name, item.name
            );
            return None;
        }
    };
    let (target, ok) = match channel {
        Property::Translation => (props::TRANSLATION, interp.kind == InterpolatorKind::Position),
        Property::Scale => (props::SCALE, interp.kind == InterpolatorKind::Position),
        _ => (props::ROTATION, interp.kind == InterpolatorKind::Orientation),
    };
    if !ok {
        error!(
            "interpolator '{}' ({:?}) cannot drive '{}.{field}'",
            interp.name, interp.kind, item.name
        );
        return None;
    }

    let cycle = sanitize_interval(timer.cycle_interval);
    let points = interp
        .keys
        .iter()
        .zip(interp.frames())
        .map(|(k, frame)| Keypoint::new(k * cycle, keyframe_value(interp.kind, frame)))
        .collect();
    let clip = Clip::new(format!("{}:{}.{target}", interp.name, item.name), cycle).with_track(
        Track {
            target: target.to_string(),
            points,
        },
    );
    Some((clip, timer.looping))
}

impl Interactivity {
    /// Classify every record and wire its behavior. Runs once; later calls
    /// are logged and return an empty report.
    pub fn compile(
        &mut self,
        host: &mut dyn SceneHost,
        scripts: &mut dyn ScriptRuntime,
    ) -> CompileReport {
        if self.compiled.is_some() {
            warn!("interactivity already compiled; ignoring");
            return CompileReport::default();
        }
        let mut c = Compiled::default();
        let mut report = CompileReport::default();
        let mut owners: Vec<String> = Vec::new();
        let mut used_scripts: Vec<(ScriptId, bool)> = Vec::new();

        for (index, obj) in self.objects.iter().enumerate() {
            let object = ObjectId(index as u32);
            let Some(kind) = classify(obj, &self.decls) else {
                debug!("object {index} matches no behavior: {obj:?}");
                report.skipped.push(object);
                continue;
            };
            report.behaviors.push((object, kind));
            let edge = EdgeField::from_field(obj.from_trigger_field.as_deref());
            let mut trigger_driven = true;

            match kind {
                BehaviorKind::KeyframeAnimation => {
                    let Some((clip, looping)) = build_clip(obj, &self.decls) else {
                        continue;
                    };
                    let (Some(item), Some(timer)) = (obj.target, obj.timer) else {
                        continue;
                    };
                    let mode = if looping { LoopMode::Loop } else { LoopMode::Once };
                    let name = clip.name.clone();
                    let anim = self.engine.load_clip(clip);
                    let player = self.engine.create_player(&name, anim, mode);
                    let binding = c.animations.len();
                    let mut anim_binding = AnimationBinding {
                        object,
                        player,
                        item,
                        field: obj.to_target_field.clone().unwrap_or_default(),
                        running: false,
                    };
                    match obj.trigger {
                        Some(t) => c.react(t, ReactionKind::Animate { binding }, edge),
                        None => {
                            trigger_driven = false;
                            if self.decls.timers.get(timer).is_some_and(|t| t.enabled) {
                                self.pending.push(PlayerCommand::Play { player });
                                self.scheduler.register(FrameTask::Animation(player));
                                anim_binding.running = true;
                            }
                        }
                    }
                    c.animations.push(anim_binding);
                }
                BehaviorKind::ToggleBinding | BehaviorKind::ToggleFlip => {
                    if let Some(t) = obj.trigger {
                        let propagate = kind == BehaviorKind::ToggleBinding;
                        c.react(t, ReactionKind::FlipToggle { object, propagate }, edge);
                    }
                }
                BehaviorKind::ScriptInvocation(mode) => {
                    let Some(sid) = obj.script else { continue };
                    match (mode, obj.trigger) {
                        (ScriptMode::PerFrame, _) => {
                            trigger_driven = false;
                            self.scheduler.register(FrameTask::Script(sid));
                        }
                        (ScriptMode::ToggleDriven, _) => {
                            trigger_driven = false;
                            if let Some(g) = obj.toggle {
                                c.toggle_scripts.entry(g).or_default().push(sid);
                            }
                        }
                        (ScriptMode::Touch, Some(t)) => {
                            c.react(t, ReactionKind::InvokeScript { object }, edge);
                        }
                        (_, Some(t)) => c.react(t, ReactionKind::Drag { object }, edge),
                        (_, None) => trigger_driven = false,
                    }
                    used_scripts.push((sid, mode == ScriptMode::PerFrame));
                }
                BehaviorKind::PropertyBridge(bridge) => {
                    if let Some(t) = obj.trigger {
                        let kind = match bridge {
                            BridgeKind::Touch => ReactionKind::Bridge { object },
                            BridgeKind::Drag => ReactionKind::Drag { object },
                        };
                        c.react(t, kind, edge);
                    }
                }
                BehaviorKind::AnchorNavigation => {
                    if let Some(t) = obj.trigger {
                        c.react(t, ReactionKind::Anchor { object }, EdgeField::Active);
                    }
                }
            }

            if trigger_driven {
                if let Some(owner) = obj
                    .trigger
                    .and_then(|t| self.decls.triggers.get(t))
                    .map(|t| t.owner.clone())
                {
                    if !owners.contains(&owner) {
                        owners.push(owner);
                    }
                }
            }
        }

        if self.cfg.attach_colliders {
            for owner in &owners {
                host.attach_colliders(owner);
            }
            report.collider_owners = owners;
        }

        for (sid, per_frame) in used_scripts {
            let Some(s) = self.decls.scripts.get_mut(sid) else {
                continue;
            };
            if s.state.handle.is_some() || s.state.failed {
                continue;
            }
            s.state.per_frame = per_frame;
            // Per-frame scripts initialize on their first tick.
            let ok = script::load(s, scripts) && (per_frame || script::initialize(s, scripts));
            if !ok {
                report.script_failures.push(s.name.clone());
            }
        }

        info!(
            "compiled {} behaviors ({} skipped, {} animations)",
            report.behaviors.len(),
            report.skipped.len(),
            c.animations.len()
        );
        self.compiled = Some(c);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Interpolator, Timer};
    use crate::defined_item::{DefinedItem, TargetKind};
    use crate::registry::{InterpolatorId, TimerId};

    #[test]
    fn keys_scale_by_cycle_interval() {
        let mut d = Declarations::new();
        d.timers.insert("clock", Timer::new("clock", 2.0, false));
        d.interpolators.insert(
            "mover",
            Interpolator::new(
                "mover",
                InterpolatorKind::Position,
                vec![0.0, 0.5, 1.0],
                vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            ),
        );
        d.items
            .insert("Box", DefinedItem::new("Box", TargetKind::SceneNode, "Box"));
        let obj = InteractiveObject {
            timer: Some(TimerId(0)),
            interpolator: Some(InterpolatorId(0)),
            target: Some(ItemId(0)),
            to_target_field: Some("set_translation".into()),
            ..Default::default()
        };
        let (clip, looping) = build_clip(&obj, &d).unwrap();
        assert!(!looping);
        assert_eq!(clip.duration, 2.0);
        let times: Vec<f32> = clip.tracks[0].points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
        assert_eq!(clip.tracks[0].target, props::TRANSLATION);
        assert_eq!(clip.tracks[0].points[2].value, Value::vec3(2.0, 0.0, 0.0));
    }

    #[test]
    fn orientation_keys_become_quaternions() {
        let mut d = Declarations::new();
        d.timers.insert("clock", Timer::new("clock", 1.0, true));
        d.interpolators.insert(
            "spin",
            Interpolator::new(
                "spin",
                InterpolatorKind::Orientation,
                vec![0.0, 1.0],
                vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, std::f32::consts::PI],
            ),
        );
        d.items
            .insert("Box", DefinedItem::new("Box", TargetKind::SceneNode, "Box"));
        let mut obj = InteractiveObject {
            timer: Some(TimerId(0)),
            interpolator: Some(InterpolatorId(0)),
            target: Some(ItemId(0)),
            to_target_field: Some("rotation".into()),
            ..Default::default()
        };
        let (clip, looping) = build_clip(&obj, &d).unwrap();
        assert!(looping);
        let Value::Quat(q) = clip.tracks[0].points[1].value else {
            panic!("expected quaternion");
        };
        assert!((q[1] - 1.0).abs() < 1e-5);

        obj.to_target_field = Some("translation".into());
        assert!(build_clip(&obj, &d).is_none());
    }
}
