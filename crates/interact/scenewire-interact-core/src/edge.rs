//! Trigger input events and edge detection.
//!
//! Hosts may report trigger state on change or poll it every frame; either
//! way a behavior fires only on the rising edge of the field it listens to,
//! never on a held state.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::fields::field_matches;
use crate::registry::TriggerId;

/// Pointer state over a trigger's owner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub over: bool,
    pub active: bool,
    /// World-space hit point, when the host has one.
    #[serde(default)]
    pub hit_point: Option<[f32; 3]>,
}

impl TriggerEvent {
    pub fn over(over: bool) -> Self {
        Self {
            over,
            ..Default::default()
        }
    }

    pub fn pressed(hit_point: Option<[f32; 3]>) -> Self {
        Self {
            over: true,
            active: true,
            hit_point,
        }
    }

    pub fn released() -> Self {
        Self::over(true)
    }
}

/// Which boolean a behavior listens to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeField {
    Over,
    Active,
}

impl EdgeField {
    /// `isOver` selects the over state; any other field selects active.
    pub fn from_field(field: Option<&str>) -> EdgeField {
        match field {
            Some(f) if field_matches(f, "isover") => EdgeField::Over,
            _ => EdgeField::Active,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    pub rise_over: bool,
    pub rise_active: bool,
    pub fall_over: bool,
    pub fall_active: bool,
}

impl Edges {
    pub fn rising(&self, field: EdgeField) -> bool {
        match field {
            EdgeField::Over => self.rise_over,
            EdgeField::Active => self.rise_active,
        }
    }
}

#[derive(Debug, Default)]
pub struct EdgeTracker {
    prev: HashMap<TriggerId, (bool, bool)>,
}

impl EdgeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `ev` for `trigger` and report the edges against the previous state.
    pub fn observe(&mut self, trigger: TriggerId, ev: &TriggerEvent) -> Edges {
        let (over, active) = self
            .prev
            .insert(trigger, (ev.over, ev.active))
            .unwrap_or((false, false));
        Edges {
            rise_over: ev.over && !over,
            rise_active: ev.active && !active,
            fall_over: !ev.over && over,
            fall_active: !ev.active && active,
        }
    }

    /// Forget the state of a trigger (disabled triggers start fresh).
    pub fn reset(&mut self, trigger: TriggerId) {
        self.prev.remove(&trigger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_state_is_not_an_edge() {
        let mut e = EdgeTracker::new();
        let t = TriggerId(0);
        assert!(e.observe(t, &TriggerEvent::over(true)).rise_over);
        assert!(!e.observe(t, &TriggerEvent::over(true)).rise_over);
        let off = e.observe(t, &TriggerEvent::over(false));
        assert!(off.fall_over && !off.rise_over);
        assert!(e.observe(t, &TriggerEvent::over(true)).rise_over);
    }

    #[test]
    fn edge_field_selection() {
        assert_eq!(EdgeField::from_field(Some("isOver")), EdgeField::Over);
        assert_eq!(EdgeField::from_field(Some("isActive")), EdgeField::Active);
        assert_eq!(EdgeField::from_field(Some("touchTime")), EdgeField::Active);
        assert_eq!(EdgeField::from_field(None), EdgeField::Active);
    }
}
