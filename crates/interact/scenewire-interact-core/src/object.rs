//! Interactive objects: partial records merged from two-endpoint links.

use serde::{Deserialize, Serialize};

use crate::registry::{InterpolatorId, ItemId, ScriptId, TimerId, ToggleId, TriggerId};

/// Index of a record in the object list; stable because records are never
/// removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Every slot is optional and set at most once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractiveObject {
    pub trigger: Option<TriggerId>,
    pub from_trigger_field: Option<String>,
    pub timer: Option<TimerId>,
    pub interpolator: Option<InterpolatorId>,
    pub toggle: Option<ToggleId>,
    pub script: Option<ScriptId>,
    pub target: Option<ItemId>,
    pub to_target_field: Option<String>,
}

/// Fill an empty slot. Returns false and leaves the slot alone when it is
/// already set.
fn fill<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

impl InteractiveObject {
    pub fn fill_trigger(&mut self, id: TriggerId, field: &str) -> bool {
        if !fill(&mut self.trigger, id) {
            return false;
        }
        self.from_trigger_field = Some(field.to_string());
        true
    }

    pub fn fill_timer(&mut self, id: TimerId) -> bool {
        fill(&mut self.timer, id)
    }

    pub fn fill_interpolator(&mut self, id: InterpolatorId) -> bool {
        fill(&mut self.interpolator, id)
    }

    pub fn fill_toggle(&mut self, id: ToggleId) -> bool {
        fill(&mut self.toggle, id)
    }

    pub fn fill_script(&mut self, id: ScriptId) -> bool {
        fill(&mut self.script, id)
    }

    /// Target and its field travel together; the field is only recorded when
    /// the target slot was empty.
    pub fn fill_target(&mut self, id: ItemId, field: Option<&str>) -> bool {
        if !fill(&mut self.target, id) {
            return false;
        }
        self.to_target_field = field.map(str::to_string);
        true
    }

    /// Number of populated entity slots.
    pub fn arity(&self) -> usize {
        [
            self.trigger.is_some(),
            self.timer.is_some(),
            self.interpolator.is_some(),
            self.toggle.is_some(),
            self.script.is_some(),
            self.target.is_some(),
        ]
        .into_iter()
        .filter(|b| *b)
        .count()
    }

    /// Copy of the trigger/timer linkage, used when one driver fans out to a
    /// second interpolator or target.
    pub fn driver_linkage(&self) -> InteractiveObject {
        InteractiveObject {
            trigger: self.trigger,
            from_trigger_field: self.from_trigger_field.clone(),
            timer: self.timer,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_set_once() {
        let mut o = InteractiveObject::default();
        assert!(o.fill_trigger(TriggerId(0), "isOver"));
        assert!(!o.fill_trigger(TriggerId(1), "isActive"));
        assert_eq!(o.trigger, Some(TriggerId(0)));
        assert_eq!(o.from_trigger_field.as_deref(), Some("isOver"));

        assert!(o.fill_target(ItemId(2), Some("translation")));
        assert!(!o.fill_target(ItemId(3), Some("rotation")));
        assert_eq!(o.to_target_field.as_deref(), Some("translation"));
        assert_eq!(o.arity(), 2);
    }
}
