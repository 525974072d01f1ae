//! Event dispatch: trigger edges, frame ticks, toggle propagation.

use log::{debug, error, warn};

use scenewire_animation_core::{CoreEvent, Inputs, PlayerCommand};
use scenewire_api_core::coercion::{to_bool, to_quat, to_vec3};
use scenewire_api_core::math::QUAT_IDENTITY;
use scenewire_api_core::{props, SceneHost, ScriptError, ScriptRuntime, Value, WriteBatch};

use crate::anchor;
use crate::compiler::ReactionKind;
use crate::decl::TriggerKind;
use crate::drag::{DragBaseline, DragKind, DragOutput, DragRuntime, DragSession, DragSink};
use crate::edge::TriggerEvent;
use crate::fields::{DragField, Property};
use crate::object::ObjectId;
use crate::registry::{ScriptId, ToggleId, TriggerId};
use crate::scheduler::FrameTask;
use crate::script::{self, ScriptEvent};
use crate::Interactivity;

/// Everything one frame tick did.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// Clock time after this tick, in seconds.
    pub elapsed: f64,
    pub writes: WriteBatch,
    /// Animation events (started, ended, ...) seen this tick.
    pub events: Vec<CoreEvent>,
    /// Objects whose one-shot animation finished this tick.
    pub finished: Vec<ObjectId>,
    pub script_errors: Vec<ScriptError>,
}

/// What a single trigger event did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerReport {
    pub writes: WriteBatch,
    pub navigations: Vec<anchor::Navigation>,
    /// Toggles flipped by this event.
    pub flipped: Vec<ToggleId>,
    pub script_errors: Vec<ScriptError>,
}

impl Interactivity {
    /// Feed pointer state for trigger `name`. Call on change or every frame;
    /// behaviors fire on rising edges only.
    pub fn on_trigger(
        &mut self,
        name: &str,
        event: TriggerEvent,
        host: &mut dyn SceneHost,
        scripts: &mut dyn ScriptRuntime,
    ) -> TriggerReport {
        let mut report = TriggerReport::default();
        let Some(tid) = self.decls.triggers.find(name) else {
            warn!("event for unknown trigger '{name}'");
            return report;
        };
        if !self.decls.triggers.get(tid).is_some_and(|t| t.enabled) {
            debug!("trigger '{name}' is disabled; event ignored");
            return report;
        }
        let edges = self.edges.observe(tid, &event);

        if self.drag.armed_by(tid) && DragRuntime::should_release(event.active, event.over) {
            self.release_drag();
        }

        let reactions = match &self.compiled {
            Some(c) => c.reactions.get(&tid).cloned().unwrap_or_default(),
            None => {
                debug!("trigger '{name}' fired before compile");
                return report;
            }
        };
        for reaction in reactions {
            match reaction.kind {
                ReactionKind::Drag { object } => {
                    if edges.rise_active && event.over {
                        self.arm_drag(tid, object, &event, &*host);
                    }
                }
                kind if edges.rising(reaction.edge) => {
                    self.react(kind, &event, host, scripts, &mut report);
                }
                _ => {}
            }
        }
        report
    }

    fn react(
        &mut self,
        kind: ReactionKind,
        event: &TriggerEvent,
        host: &mut dyn SceneHost,
        scripts: &mut dyn ScriptRuntime,
        report: &mut TriggerReport,
    ) {
        match kind {
            ReactionKind::Animate { binding } => {
                let Some(anim) = self
                    .compiled
                    .as_mut()
                    .and_then(|c| c.animations.get_mut(binding))
                else {
                    return;
                };
                if anim.running {
                    debug!("animation for object {:?} already running", anim.object);
                    return;
                }
                anim.running = true;
                let player = anim.player;
                self.pending.push(PlayerCommand::Play { player });
                self.scheduler.register(FrameTask::Animation(player));
            }
            ReactionKind::FlipToggle { object, propagate } => {
                let Some(g) = self.objects.get(object.index()).and_then(|o| o.toggle) else {
                    return;
                };
                let Some(t) = self.decls.toggles.get_mut(g) else {
                    return;
                };
                t.state = !t.state;
                debug!("toggle '{}' -> {}", t.name, t.state);
                report.flipped.push(g);
                if propagate {
                    self.write_toggle_targets(g, host, &mut report.writes);
                }
                self.run_toggle_scripts(
                    g,
                    host,
                    scripts,
                    &mut report.writes,
                    &mut report.script_errors,
                );
            }
            ReactionKind::InvokeScript { object } => {
                let Some(sid) = self.objects.get(object.index()).and_then(|o| o.script) else {
                    return;
                };
                let ev = ScriptEvent {
                    over: event.over,
                    active: event.active,
                    hit_point: event.hit_point,
                    payload: Vec::new(),
                };
                self.run_script(
                    sid,
                    Some(&ev),
                    host,
                    scripts,
                    &mut report.writes,
                    &mut report.script_errors,
                );
            }
            ReactionKind::Bridge { object } => self.touch_bridge(object, host, &mut report.writes),
            ReactionKind::Anchor { object } => {
                let url = self
                    .objects
                    .get(object.index())
                    .and_then(|o| o.trigger)
                    .and_then(|t| self.decls.triggers.get(t))
                    .and_then(|t| match &t.kind {
                        TriggerKind::Anchor { url, .. } => Some(url.clone()),
                        _ => None,
                    });
                if let Some(url) = url {
                    report
                        .navigations
                        .push(anchor::navigate(&url, &self.cfg, &self.decls, host));
                }
            }
            ReactionKind::Drag { .. } => {}
        }
    }

    /// Touch on a light or media item: flip `on`, or issue the media command.
    fn touch_bridge(&mut self, object: ObjectId, host: &mut dyn SceneHost, batch: &mut WriteBatch) {
        let Some(obj) = self.objects.get(object.index()) else {
            return;
        };
        let Some(item) = obj.target.and_then(|i| self.decls.items.get_mut(i)) else {
            return;
        };
        let field = obj.to_target_field.as_deref().unwrap_or(props::ON);
        match Property::from_field(field) {
            Some(Property::On) => {
                let current = item.read(field, &*host).map(|v| to_bool(&v)).unwrap_or(false);
                item.apply(field, &Value::Bool(!current), host, batch);
            }
            Some(Property::MediaStart | Property::MediaPause | Property::MediaStop) => {
                item.apply(field, &Value::Bool(true), host, batch);
            }
            _ => error!("touch on '{}' cannot drive field '{field}'", item.name),
        }
    }

    fn arm_drag(
        &mut self,
        trigger: TriggerId,
        object: ObjectId,
        event: &TriggerEvent,
        host: &dyn SceneHost,
    ) {
        let Some(obj) = self.objects.get(object.index()) else {
            return;
        };
        let Some(kind) = self
            .decls
            .triggers
            .get(trigger)
            .and_then(|t| DragKind::from_trigger(&t.kind))
        else {
            return;
        };
        let from = DragField::from_field(obj.from_trigger_field.as_deref());
        let item = obj.target.and_then(|i| self.decls.items.get(i));
        let sink = match (obj.script, obj.target) {
            (Some(_), _) => DragSink::Script { object },
            (None, Some(item)) => DragSink::Item {
                item,
                field: obj
                    .to_target_field
                    .clone()
                    .unwrap_or_else(|| props::TRANSLATION.to_string()),
            },
            (None, None) => return,
        };
        let base = DragBaseline {
            look_direction: host.camera_look_direction(),
            camera_position: host.camera_position(),
            translation: item
                .and_then(|i| i.read(props::TRANSLATION, host))
                .map(|v| to_vec3(&v))
                .unwrap_or_default(),
            rotation: item
                .and_then(|i| i.read(props::ROTATION, host))
                .map(|v| to_quat(&v))
                .unwrap_or(QUAT_IDENTITY),
            hit_point: event.hit_point,
        };
        if let Some(previous) = self.drag.session().map(|s| s.trigger) {
            self.scheduler.unregister(FrameTask::Drag(previous));
        }
        self.drag.arm(DragSession::new(trigger, kind, from, sink, base));
        self.scheduler.register(FrameTask::Drag(trigger));
    }

    pub(crate) fn release_drag(&mut self) {
        if let Some(s) = self.drag.disarm() {
            self.scheduler.unregister(FrameTask::Drag(s.trigger));
        }
    }

    /// Step the live drag session and deliver its output.
    fn step_drag(
        &mut self,
        host: &mut dyn SceneHost,
        scripts: &mut dyn ScriptRuntime,
        batch: &mut WriteBatch,
        errors: &mut Vec<ScriptError>,
    ) {
        let Some(session) = self.drag.session().cloned() else {
            return;
        };
        let output = session.step(host.camera_look_direction());
        match session.sink {
            DragSink::Item { item, field } => {
                let value = match &output {
                    DragOutput::Translation(v) => Value::Vec3(*v),
                    DragOutput::Rotation(r) => Value::AxisAngle(*r),
                };
                if let Some(item) = self.decls.items.get_mut(item) {
                    item.apply(&field, &value, host, batch);
                }
            }
            DragSink::Script { object } => {
                let Some(sid) = self.objects.get(object.index()).and_then(|o| o.script) else {
                    return;
                };
                let ev = ScriptEvent {
                    over: true,
                    active: true,
                    hit_point: session.base.hit_point,
                    payload: output.payload(),
                };
                self.run_script(sid, Some(&ev), host, scripts, batch, errors);
            }
        }
    }

    /// Invoke a script, then push any toggles it changed to their item
    /// targets. Toggle-driven scripts are not re-run from here.
    fn run_script(
        &mut self,
        sid: ScriptId,
        event: Option<&ScriptEvent>,
        host: &mut dyn SceneHost,
        scripts: &mut dyn ScriptRuntime,
        batch: &mut WriteBatch,
        errors: &mut Vec<ScriptError>,
    ) {
        match script::invoke(sid, &mut self.decls, scripts, host, batch, event, self.elapsed) {
            Ok(flipped) => {
                for g in flipped {
                    self.write_toggle_targets(g, host, batch);
                }
            }
            Err(e) => {
                error!("{e}");
                errors.push(e);
            }
        }
    }

    fn run_toggle_scripts(
        &mut self,
        toggle: ToggleId,
        host: &mut dyn SceneHost,
        scripts: &mut dyn ScriptRuntime,
        batch: &mut WriteBatch,
        errors: &mut Vec<ScriptError>,
    ) {
        let ids = self
            .compiled
            .as_ref()
            .and_then(|c| c.toggle_scripts.get(&toggle).cloned())
            .unwrap_or_default();
        for sid in ids {
            self.run_script(sid, None, host, scripts, batch, errors);
        }
    }

    /// Write a toggle's state to the target of every record sharing it.
    fn write_toggle_targets(
        &mut self,
        toggle: ToggleId,
        host: &mut dyn SceneHost,
        batch: &mut WriteBatch,
    ) {
        let Some(state) = self.decls.toggles.get(toggle).map(|t| t.state) else {
            return;
        };
        let targets: Vec<_> = self
            .objects
            .iter()
            .filter(|o| o.toggle == Some(toggle) && o.script.is_none())
            .filter_map(|o| {
                let field = o.to_target_field.clone().unwrap_or_else(|| props::ON.into());
                Some((o.target?, field))
            })
            .collect();
        for (item, field) in targets {
            if let Some(item) = self.decls.items.get_mut(item) {
                item.apply(&field, &Value::Bool(state), host, batch);
            }
        }
    }

    /// Frame-clock callback: advance animations, the drag session and
    /// per-frame scripts, in registration order.
    pub fn tick(
        &mut self,
        dt: f32,
        host: &mut dyn SceneHost,
        scripts: &mut dyn ScriptRuntime,
    ) -> FrameReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt as f64;
        let mut report = FrameReport {
            elapsed: self.elapsed,
            ..Default::default()
        };
        if self.compiled.is_none() {
            return report;
        }

        let inputs = Inputs {
            player_cmds: std::mem::take(&mut self.pending),
        };
        let out = self.engine.update(dt, inputs).clone();
        for change in &out.changes {
            let Some(item) = self
                .compiled
                .as_ref()
                .and_then(|c| c.animation_for(change.player).map(|i| c.animations[i].item))
            else {
                continue;
            };
            if let Some(item) = self.decls.items.get_mut(item) {
                item.apply(&change.key, &change.value, host, &mut report.writes);
            }
        }
        // Cleared from player state; the event cap may drop `PlaybackEnded`.
        if let Some(c) = self.compiled.as_mut() {
            for anim in c.animations.iter_mut().filter(|a| a.running) {
                if !self.engine.is_playing(anim.player) {
                    anim.running = false;
                    self.scheduler.unregister(FrameTask::Animation(anim.player));
                    report.finished.push(anim.object);
                }
            }
        }
        report.events = out.events;

        let tasks: Vec<FrameTask> = self.scheduler.iter().collect();
        for task in tasks {
            match task {
                FrameTask::Animation(_) => {}
                FrameTask::Drag(_) => {
                    self.step_drag(host, scripts, &mut report.writes, &mut report.script_errors)
                }
                FrameTask::Script(sid) => self.run_script(
                    sid,
                    None,
                    host,
                    scripts,
                    &mut report.writes,
                    &mut report.script_errors,
                ),
            }
        }
        report
    }
}
