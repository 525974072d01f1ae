//! scenewire interactivity core
//!
//! Turns declared scene entities (triggers, timers, interpolators, toggles,
//! scripts, scene targets) and the two-endpoint links between them into a
//! running interactivity layer.
//!
//! The lifecycle follows a markup parser's call order:
//! 1. `declare_*` every entity, then `link` every link statement;
//! 2. `compile` once, which classifies every merged record and wires its
//!    behavior (keyframe players, toggle bindings, script invocations,
//!    property bridges, drags, anchors);
//! 3. feed `on_trigger` pointer events and `tick` the frame clock.
//!
//! The scene graph and the script engine are black boxes behind
//! [`SceneHost`] and [`ScriptRuntime`].

pub mod anchor;
pub mod classify;
pub mod compiler;
pub mod config;
pub mod decl;
pub mod defined_item;
pub mod document;
pub mod drag;
pub mod edge;
pub mod fields;
pub mod link;
pub mod object;
pub mod registry;
pub mod runtime;
pub mod scene_store;
pub mod scheduler;
pub mod script;

use log::warn;

use scenewire_animation_core::{Engine, PlayerCommand};
use scenewire_api_core::{SceneHost, ScriptRuntime};

pub use crate::anchor::Navigation;
pub use crate::classify::{classify, BehaviorKind, BridgeKind, ScriptMode};
pub use crate::compiler::CompileReport;
pub use crate::config::InteractConfig;
pub use crate::decl::{
    Access, Declarations, Interpolator, InterpolatorKind, ScriptField, ScriptObject, Timer,
    Toggle, Trigger, TriggerKind,
};
pub use crate::defined_item::{DefinedItem, TargetKind};
pub use crate::document::{DeclarationError, SceneDocument};
pub use crate::drag::DragSession;
pub use crate::edge::TriggerEvent;
pub use crate::link::{Link, LinkOutcome, LinkSide};
pub use crate::object::{InteractiveObject, ObjectId};
pub use crate::registry::{InterpolatorId, ItemId, ScriptId, TimerId, ToggleId, TriggerId};
pub use crate::runtime::{FrameReport, TriggerReport};
pub use crate::scene_store::MemoryScene;
pub use crate::scheduler::{FrameScheduler, FrameTask};
pub use crate::script::NullRuntime;

use crate::compiler::Compiled;
use crate::decl::sanitize_interval;
use crate::drag::DragRuntime;
use crate::edge::EdgeTracker;

/// The interactivity layer of one scene.
#[derive(Debug)]
pub struct Interactivity {
    cfg: InteractConfig,
    decls: Declarations,
    objects: Vec<InteractiveObject>,
    compiled: Option<Compiled>,
    edges: EdgeTracker,
    drag: DragRuntime,
    scheduler: FrameScheduler,
    engine: Engine,
    /// Seconds since the first tick.
    elapsed: f64,
    /// Player commands applied on the next tick.
    pending: Vec<PlayerCommand>,
}

impl Default for Interactivity {
    fn default() -> Self {
        Self::new(InteractConfig::default())
    }
}

impl Interactivity {
    pub fn new(cfg: InteractConfig) -> Self {
        Self {
            engine: Engine::new(cfg.animation.clone()),
            cfg,
            decls: Declarations::new(),
            objects: Vec::new(),
            compiled: None,
            edges: EdgeTracker::new(),
            drag: DragRuntime::new(),
            scheduler: FrameScheduler::new(),
            elapsed: 0.0,
            pending: Vec::new(),
        }
    }

    fn warn_if_compiled(&self, what: &str) {
        if self.compiled.is_some() {
            warn!("{what} after compile has no runtime effect");
        }
    }

    /// Declare a trigger. Anchors get their single-slot record here since
    /// they are never the subject of a link.
    pub fn declare_trigger(&mut self, trigger: Trigger) -> TriggerId {
        self.warn_if_compiled("trigger declaration");
        let is_anchor = matches!(trigger.kind, TriggerKind::Anchor { .. });
        let before = self.decls.triggers.len();
        let id = self.decls.triggers.insert(&trigger.name.clone(), trigger);
        if is_anchor && self.decls.triggers.len() > before {
            link::register_anchor(&mut self.objects, id);
        }
        id
    }

    pub fn declare_timer(&mut self, mut timer: Timer) -> TimerId {
        self.warn_if_compiled("timer declaration");
        let interval = sanitize_interval(timer.cycle_interval);
        if interval != timer.cycle_interval {
            warn!(
                "timer '{}' has cycle interval {}; using {interval}",
                timer.name, timer.cycle_interval
            );
            timer.cycle_interval = interval;
        }
        self.decls.timers.insert(&timer.name.clone(), timer)
    }

    pub fn declare_interpolator(&mut self, mut interp: Interpolator) -> InterpolatorId {
        self.warn_if_compiled("interpolator declaration");
        interp.sanitize();
        self.decls.interpolators.insert(&interp.name.clone(), interp)
    }

    pub fn declare_toggle(&mut self, toggle: Toggle) -> ToggleId {
        self.warn_if_compiled("toggle declaration");
        self.decls.toggles.insert(&toggle.name.clone(), toggle)
    }

    pub fn declare_script(&mut self, script: ScriptObject) -> ScriptId {
        self.warn_if_compiled("script declaration");
        self.decls.scripts.insert(&script.name.clone(), script)
    }

    pub fn declare_item(&mut self, item: DefinedItem) -> ItemId {
        self.warn_if_compiled("item declaration");
        self.decls.items.insert(&item.name.clone(), item)
    }

    /// Resolve one link statement into the object list.
    pub fn link(
        &mut self,
        from_node: &str,
        from_field: &str,
        to_node: &str,
        to_field: &str,
    ) -> LinkOutcome {
        self.warn_if_compiled("link");
        let l = Link::new(from_node, from_field, to_node, to_field);
        link::resolve_link(&mut self.decls, &mut self.objects, &l)
    }

    /// Enable or disable a trigger. Disabling releases a drag it owns and
    /// forgets its edge state. Returns false for unknown names.
    pub fn set_trigger_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let Some(id) = self.decls.triggers.find(name) else {
            warn!("set_trigger_enabled: unknown trigger '{name}'");
            return false;
        };
        if let Some(t) = self.decls.triggers.get_mut(id) {
            t.enabled = enabled;
        }
        if !enabled {
            if self.drag.armed_by(id) {
                self.release_drag();
            }
            self.edges.reset(id);
        }
        true
    }

    pub fn config(&self) -> &InteractConfig {
        &self.cfg
    }

    pub fn declarations(&self) -> &Declarations {
        &self.decls
    }

    pub fn objects(&self) -> &[InteractiveObject] {
        &self.objects
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn toggle_state(&self, name: &str) -> Option<bool> {
        self.decls.toggles.by_name(name).map(|t| t.state)
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// The keyframe clip compiled for `object`, if it is an animation.
    pub fn clip_for(&self, object: ObjectId) -> Option<&scenewire_animation_core::Clip> {
        let c = self.compiled.as_ref()?;
        let anim = c.animations.iter().find(|a| a.object == object)?;
        let player = self.engine.player(anim.player)?;
        self.engine.clip(player.clip)
    }

    /// Whether the animation compiled for `object` is in flight.
    pub fn animation_running(&self, object: ObjectId) -> bool {
        self.compiled
            .as_ref()
            .and_then(|c| c.animations.iter().find(|a| a.object == object))
            .is_some_and(|a| a.running)
    }
}

/// Convenience for hosts that drive a compiled scene from a document.
pub fn load_document(
    json: &str,
    cfg: InteractConfig,
    host: &mut dyn SceneHost,
    scripts: &mut dyn ScriptRuntime,
) -> anyhow::Result<(Interactivity, CompileReport)> {
    let doc = SceneDocument::from_json(json)?;
    let mut ix = Interactivity::new(cfg);
    doc.apply(&mut ix)?;
    let report = ix.compile(host, scripts);
    Ok((ix, report))
}
