//! Behavior classification of completed interactive objects.
//!
//! Predicates are checked in a fixed order and the first match wins; the
//! set is not mutually exclusive, so the order is the precedence.

use serde::{Deserialize, Serialize};

use crate::decl::{Declarations, TriggerKind};
use crate::object::InteractiveObject;

/// What drives a script invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptMode {
    Touch,
    Plane,
    Cylinder,
    Sphere,
    /// Timer without trigger: invoked every frame.
    PerFrame,
    /// Toggle without trigger or timer: invoked when the toggle flips.
    ToggleDriven,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeKind {
    /// Touch edge flips a light or drives a media player.
    Touch,
    /// Plane / cylinder / sphere manipulation of the target.
    Drag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    KeyframeAnimation,
    ToggleBinding,
    ScriptInvocation(ScriptMode),
    PropertyBridge(BridgeKind),
    ToggleFlip,
    AnchorNavigation,
}

/// Classify one record. `None` means nothing runs for it on its own (it may
/// still be reached by toggle propagation).
pub fn classify(obj: &InteractiveObject, decls: &Declarations) -> Option<BehaviorKind> {
    let trigger_kind = obj
        .trigger
        .and_then(|t| decls.triggers.get(t))
        .map(|t| &t.kind);

    if obj.timer.is_some() && obj.interpolator.is_some() && obj.target.is_some() {
        return Some(BehaviorKind::KeyframeAnimation);
    }
    if obj.trigger.is_some() && obj.toggle.is_some() && obj.target.is_some() {
        return Some(BehaviorKind::ToggleBinding);
    }
    if obj.script.is_some() {
        let mode = match trigger_kind {
            Some(TriggerKind::Plane { .. }) => ScriptMode::Plane,
            Some(TriggerKind::Cylinder { .. }) => ScriptMode::Cylinder,
            Some(TriggerKind::Sphere) => ScriptMode::Sphere,
            Some(TriggerKind::Touch) | Some(TriggerKind::Anchor { .. }) => ScriptMode::Touch,
            None if obj.timer.is_some() => ScriptMode::PerFrame,
            None if obj.toggle.is_some() => ScriptMode::ToggleDriven,
            None => return None,
        };
        return Some(BehaviorKind::ScriptInvocation(mode));
    }
    if let (Some(kind), Some(_)) = (trigger_kind, obj.target) {
        return match kind {
            k if k.is_drag() => Some(BehaviorKind::PropertyBridge(BridgeKind::Drag)),
            TriggerKind::Touch => Some(BehaviorKind::PropertyBridge(BridgeKind::Touch)),
            _ => None,
        };
    }
    if obj.trigger.is_some() && obj.toggle.is_some() {
        return Some(BehaviorKind::ToggleFlip);
    }
    if let Some(TriggerKind::Anchor { .. }) = trigger_kind {
        return Some(BehaviorKind::AnchorNavigation);
    }
    None
}
