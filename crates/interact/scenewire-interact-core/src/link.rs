//! Link resolver: merges two-endpoint link statements into interactive
//! objects.
//!
//! Each link names a source and a destination entity. The destination is
//! resolved first, in priority order (Timer, Interpolator, Toggle, Script,
//! Item); the existing records are then scanned by identity for one that
//! already owns the destination, and the source is merged into its matching
//! empty slot. When nothing owns the destination, or the slot is taken, a new
//! record is created. Records are only ever appended, and a slot that is set
//! is never overwritten.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::decl::{BindingEnd, Declarations, EntityRef, FieldBinding};
use crate::object::{InteractiveObject, ObjectId};
use crate::registry::{InterpolatorId, ItemId, ScriptId, TimerId, ToggleId, TriggerId};

/// One link statement: `fromNode.fromField -> toNode.toField`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub from_node: String,
    pub from_field: String,
    pub to_node: String,
    pub to_field: String,
}

impl Link {
    pub fn new(from_node: &str, from_field: &str, to_node: &str, to_field: &str) -> Self {
        Self {
            from_node: from_node.to_string(),
            from_field: from_field.to_string(),
            to_node: to_node.to_string(),
            to_field: to_field.to_string(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkSide {
    From,
    To,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkOutcome {
    /// The link filled slots of (or bound fields on) an existing record.
    Merged { object: ObjectId },
    /// A new record was appended.
    Created { object: ObjectId },
    /// A name did not resolve in any registry.
    Unresolved { side: LinkSide },
    /// Both names resolved but the pairing means nothing to the core.
    Unsupported,
}

impl LinkOutcome {
    pub fn object(self) -> Option<ObjectId> {
        match self {
            LinkOutcome::Merged { object } | LinkOutcome::Created { object } => Some(object),
            _ => None,
        }
    }
}

fn oid(index: usize) -> ObjectId {
    ObjectId(index as u32)
}

fn position(
    objects: &[InteractiveObject],
    pred: impl Fn(&InteractiveObject) -> bool,
) -> Option<usize> {
    objects.iter().position(pred)
}

fn create(objects: &mut Vec<InteractiveObject>, obj: InteractiveObject) -> LinkOutcome {
    objects.push(obj);
    LinkOutcome::Created {
        object: oid(objects.len() - 1),
    }
}

fn merged(index: usize) -> LinkOutcome {
    LinkOutcome::Merged {
        object: oid(index),
    }
}

/// Record the single-slot object an anchor trigger gets at declaration.
pub fn register_anchor(objects: &mut Vec<InteractiveObject>, trigger: TriggerId) -> ObjectId {
    objects.push(InteractiveObject {
        trigger: Some(trigger),
        ..Default::default()
    });
    oid(objects.len() - 1)
}

/// Resolve one link into `objects`. Never fails: unresolved names and
/// unsupported pairings are logged and reported through the outcome.
pub fn resolve_link(
    decls: &mut Declarations,
    objects: &mut Vec<InteractiveObject>,
    link: &Link,
) -> LinkOutcome {
    for name in [&link.from_node, &link.to_node] {
        if decls.ambiguity(name) > 1 {
            warn!("'{name}' is declared in several registries; resolving by priority");
        }
    }
    let Some(to) = decls.resolve_destination(&link.to_node) else {
        if decls.triggers.find(&link.to_node).is_some() {
            warn!(
                "link into trigger '{}.{}' is not supported",
                link.to_node, link.to_field
            );
            return LinkOutcome::Unsupported;
        }
        warn!("link destination '{}' not found", link.to_node);
        return LinkOutcome::Unresolved { side: LinkSide::To };
    };
    let Some(from) = decls.resolve(&link.from_node) else {
        warn!("link source '{}' not found", link.from_node);
        return LinkOutcome::Unresolved {
            side: LinkSide::From,
        };
    };

    let outcome = match to {
        EntityRef::Timer(t) => into_timer(decls, objects, link, from, t),
        EntityRef::Interpolator(i) => into_interpolator(objects, from, i),
        EntityRef::Toggle(g) => into_toggle(decls, objects, link, from, g),
        EntityRef::Script(s) => into_script(decls, objects, link, from, s),
        EntityRef::Item(i) => into_item(decls, objects, link, from, i),
        EntityRef::Trigger(_) => LinkOutcome::Unsupported,
    };
    match outcome {
        LinkOutcome::Unsupported => warn!(
            "unsupported link {}.{} -> {}.{}",
            link.from_node, link.from_field, link.to_node, link.to_field
        ),
        other => debug!(
            "link {}.{} -> {}.{}: {other:?}",
            link.from_node, link.from_field, link.to_node, link.to_field
        ),
    }
    outcome
}

/// Find the record owning `script`, creating `{script}` when there is none.
fn script_record(objects: &mut Vec<InteractiveObject>, script: ScriptId) -> (usize, bool) {
    match position(objects, |o| o.script == Some(script)) {
        Some(i) => (i, false),
        None => {
            objects.push(InteractiveObject {
                script: Some(script),
                ..Default::default()
            });
            (objects.len() - 1, true)
        }
    }
}

/// Script outputs only bind fields; the script's record keeps its shape.
fn script_output(
    decls: &mut Declarations,
    objects: &mut Vec<InteractiveObject>,
    link: &Link,
    script: ScriptId,
    end: BindingEnd,
) -> LinkOutcome {
    if let Some(s) = decls.scripts.get_mut(script) {
        s.bind_output(
            &link.from_field,
            FieldBinding {
                end,
                field: link.to_field.clone(),
            },
        );
    }
    let (index, created) = script_record(objects, script);
    if let BindingEnd::Item(item) = end {
        objects[index].fill_target(item, Some(&link.to_field));
    }
    if created {
        LinkOutcome::Created {
            object: oid(index),
        }
    } else {
        merged(index)
    }
}

fn into_timer(
    decls: &mut Declarations,
    objects: &mut Vec<InteractiveObject>,
    link: &Link,
    from: EntityRef,
    timer: TimerId,
) -> LinkOutcome {
    match from {
        EntityRef::Trigger(t) => {
            if let Some(i) = position(objects, |o| o.timer == Some(timer) && o.trigger.is_none())
            {
                objects[i].fill_trigger(t, &link.from_field);
                return merged(i);
            }
            create(
                objects,
                InteractiveObject {
                    trigger: Some(t),
                    from_trigger_field: Some(link.from_field.clone()),
                    timer: Some(timer),
                    ..Default::default()
                },
            )
        }
        // Does not fill the timer slot: that would turn the script per-frame.
        EntityRef::Script(s) => script_output(decls, objects, link, s, BindingEnd::Timer(timer)),
        _ => LinkOutcome::Unsupported,
    }
}

fn into_interpolator(
    objects: &mut Vec<InteractiveObject>,
    from: EntityRef,
    interp: InterpolatorId,
) -> LinkOutcome {
    let EntityRef::Timer(timer) = from else {
        return LinkOutcome::Unsupported;
    };
    if let Some(i) = position(objects, |o| o.interpolator == Some(interp)) {
        if objects[i].fill_timer(timer) {
            return merged(i);
        }
        return create(
            objects,
            InteractiveObject {
                timer: Some(timer),
                interpolator: Some(interp),
                ..Default::default()
            },
        );
    }
    // Prefer the record already holding this timer so one timer does not
    // fragment into several partial records.
    if let Some(i) = position(objects, |o| o.timer == Some(timer)) {
        if objects[i].fill_interpolator(interp) {
            return merged(i);
        }
        let mut fan_out = objects[i].driver_linkage();
        fan_out.interpolator = Some(interp);
        return create(objects, fan_out);
    }
    create(
        objects,
        InteractiveObject {
            timer: Some(timer),
            interpolator: Some(interp),
            ..Default::default()
        },
    )
}

fn into_toggle(
    decls: &mut Declarations,
    objects: &mut Vec<InteractiveObject>,
    link: &Link,
    from: EntityRef,
    toggle: ToggleId,
) -> LinkOutcome {
    match from {
        EntityRef::Trigger(t) => {
            if let Some(i) =
                position(objects, |o| o.toggle == Some(toggle) && o.trigger.is_none())
            {
                objects[i].fill_trigger(t, &link.from_field);
                return merged(i);
            }
            create(
                objects,
                InteractiveObject {
                    trigger: Some(t),
                    from_trigger_field: Some(link.from_field.clone()),
                    toggle: Some(toggle),
                    ..Default::default()
                },
            )
        }
        EntityRef::Script(s) => script_output(decls, objects, link, s, BindingEnd::Toggle(toggle)),
        _ => LinkOutcome::Unsupported,
    }
}

fn into_script(
    decls: &mut Declarations,
    objects: &mut Vec<InteractiveObject>,
    link: &Link,
    from: EntityRef,
    script: ScriptId,
) -> LinkOutcome {
    let end = match from {
        EntityRef::Trigger(t) => BindingEnd::Trigger(t),
        EntityRef::Item(i) => BindingEnd::Item(i),
        EntityRef::Toggle(g) => BindingEnd::Toggle(g),
        EntityRef::Timer(t) => BindingEnd::Timer(t),
        _ => return LinkOutcome::Unsupported,
    };
    if let Some(s) = decls.scripts.get_mut(script) {
        s.bind_input(
            &link.to_field,
            FieldBinding {
                end,
                field: link.from_field.clone(),
            },
        );
    }

    if let Some(i) = position(objects, |o| o.script == Some(script)) {
        let o = &mut objects[i];
        let filled = match end {
            BindingEnd::Trigger(t) => o.fill_trigger(t, &link.from_field),
            BindingEnd::Item(item) => o.fill_target(item, None),
            BindingEnd::Toggle(g) => o.fill_toggle(g),
            BindingEnd::Timer(t) => o.fill_timer(t),
        };
        if !filled {
            debug!(
                "script '{}' record already has that slot; field binding only",
                link.to_node
            );
        }
        return merged(i);
    }

    let mut obj = InteractiveObject {
        script: Some(script),
        ..Default::default()
    };
    match end {
        BindingEnd::Trigger(t) => {
            obj.fill_trigger(t, &link.from_field);
        }
        BindingEnd::Item(item) => {
            obj.fill_target(item, None);
        }
        BindingEnd::Toggle(g) => {
            obj.fill_toggle(g);
        }
        BindingEnd::Timer(t) => {
            obj.fill_timer(t);
        }
    }
    create(objects, obj)
}

fn into_item(
    decls: &mut Declarations,
    objects: &mut Vec<InteractiveObject>,
    link: &Link,
    from: EntityRef,
    item: ItemId,
) -> LinkOutcome {
    let field = link.to_field.as_str();
    match from {
        EntityRef::Interpolator(interp) => {
            if let Some(i) = position(objects, |o| o.interpolator == Some(interp)) {
                if objects[i].fill_target(item, Some(field)) {
                    return merged(i);
                }
                let mut fan_out = objects[i].driver_linkage();
                fan_out.interpolator = Some(interp);
                fan_out.fill_target(item, Some(field));
                return create(objects, fan_out);
            }
            create(
                objects,
                InteractiveObject {
                    interpolator: Some(interp),
                    target: Some(item),
                    to_target_field: Some(field.to_string()),
                    ..Default::default()
                },
            )
        }
        EntityRef::Toggle(toggle) => {
            if let Some(i) =
                position(objects, |o| o.toggle == Some(toggle) && o.target.is_none())
            {
                objects[i].fill_target(item, Some(field));
                return merged(i);
            }
            // No trigger here: one edge flips the toggle once and propagation
            // reaches this target.
            create(
                objects,
                InteractiveObject {
                    toggle: Some(toggle),
                    target: Some(item),
                    to_target_field: Some(field.to_string()),
                    ..Default::default()
                },
            )
        }
        EntityRef::Script(s) => script_output(decls, objects, link, s, BindingEnd::Item(item)),
        EntityRef::Trigger(t) => {
            if let Some(i) = position(objects, |o| o.target == Some(item) && o.trigger.is_none())
            {
                objects[i].fill_trigger(t, &link.from_field);
                return merged(i);
            }
            create(
                objects,
                InteractiveObject {
                    trigger: Some(t),
                    from_trigger_field: Some(link.from_field.clone()),
                    target: Some(item),
                    to_target_field: Some(field.to_string()),
                    ..Default::default()
                },
            )
        }
        EntityRef::Timer(t) => {
            if let Some(i) = position(objects, |o| o.target == Some(item) && o.timer.is_none()) {
                objects[i].fill_timer(t);
                return merged(i);
            }
            create(
                objects,
                InteractiveObject {
                    timer: Some(t),
                    target: Some(item),
                    to_target_field: Some(field.to_string()),
                    ..Default::default()
                },
            )
        }
        EntityRef::Item(_) => LinkOutcome::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{
        Access, Interpolator, InterpolatorKind, ScriptField, ScriptObject, Timer, Toggle, Trigger,
        TriggerKind,
    };
    use crate::defined_item::{DefinedItem, TargetKind};

    fn decls() -> Declarations {
        let mut d = Declarations::new();
        d.triggers
            .insert("T", Trigger::new("T", "Button", TriggerKind::Touch));
        d.triggers
            .insert("T2", Trigger::new("T2", "Other", TriggerKind::Touch));
        d.timers.insert("Clock", Timer::new("Clock", 2.0, false));
        d.interpolators.insert(
            "Move",
            Interpolator::new("Move", InterpolatorKind::Position, vec![0.0, 1.0], vec![0.0; 6]),
        );
        d.interpolators.insert(
            "Turn",
            Interpolator::new(
                "Turn",
                InterpolatorKind::Orientation,
                vec![0.0, 1.0],
                vec![0.0; 8],
            ),
        );
        d.toggles.insert("G", Toggle::new("G", false));
        d.items
            .insert("Box", DefinedItem::new("Box", TargetKind::SceneNode, "Box"));
        d.items
            .insert("Lamp", DefinedItem::new("Lamp", TargetKind::Light, "Lamp"));
        d.items
            .insert("Lamp2", DefinedItem::new("Lamp2", TargetKind::Light, "Lamp2"));
        d.scripts.insert(
            "S",
            ScriptObject::new(
                "S",
                vec![
                    ScriptField::new("touched", Access::InputOnly, "SFBool"),
                    ScriptField::new("pos", Access::OutputOnly, "SFVec3f"),
                ],
                "",
            ),
        );
        d
    }

    fn run(
        d: &mut Declarations,
        objs: &mut Vec<InteractiveObject>,
        l: (&str, &str, &str, &str),
    ) -> LinkOutcome {
        resolve_link(d, objs, &Link::new(l.0, l.1, l.2, l.3))
    }

    #[test]
    fn trigger_timer_interpolator_item_is_one_record() {
        let mut d = decls();
        let mut objs = Vec::new();
        assert!(matches!(
            run(&mut d, &mut objs, ("T", "touchTime", "Clock", "startTime")),
            LinkOutcome::Created { .. }
        ));
        assert!(matches!(
            run(&mut d, &mut objs, ("Clock", "fraction_changed", "Move", "set_fraction")),
            LinkOutcome::Merged { .. }
        ));
        assert!(matches!(
            run(&mut d, &mut objs, ("Move", "value_changed", "box", "set_translation")),
            LinkOutcome::Merged { .. }
        ));
        assert_eq!(objs.len(), 1);
        let o = &objs[0];
        assert_eq!(o.trigger, Some(TriggerId(0)));
        assert_eq!(o.timer, Some(TimerId(0)));
        assert_eq!(o.interpolator, Some(InterpolatorId(0)));
        assert_eq!(o.target, Some(ItemId(0)));
        assert_eq!(o.to_target_field.as_deref(), Some("set_translation"));
    }

    #[test]
    fn second_interpolator_on_a_timer_fans_out_with_the_driver() {
        let mut d = decls();
        let mut objs = Vec::new();
        run(&mut d, &mut objs, ("T", "isActive", "Clock", "startTime"));
        run(&mut d, &mut objs, ("Clock", "fraction_changed", "Move", "set_fraction"));
        let out = run(&mut d, &mut objs, ("Clock", "fraction_changed", "Turn", "set_fraction"));
        assert_eq!(out, LinkOutcome::Created { object: ObjectId(1) });
        assert_eq!(objs[1].trigger, Some(TriggerId(0)));
        assert_eq!(objs[1].from_trigger_field.as_deref(), Some("isActive"));
        assert_eq!(objs[1].interpolator, Some(InterpolatorId(1)));
        // The first record is untouched.
        assert_eq!(objs[0].interpolator, Some(InterpolatorId(0)));
    }

    #[test]
    fn toggle_second_target_gets_a_trigger_free_record() {
        let mut d = decls();
        let mut objs = Vec::new();
        run(&mut d, &mut objs, ("T", "isActive", "G", "toggle"));
        run(&mut d, &mut objs, ("G", "toggle_changed", "Lamp", "on"));
        run(&mut d, &mut objs, ("G", "toggle_changed", "Lamp2", "on"));
        assert_eq!(objs.len(), 2);
        assert_eq!(objs[0].target, Some(ItemId(1)));
        assert_eq!(objs[1].trigger, None);
        assert_eq!(objs[1].toggle, Some(ToggleId(0)));
        assert_eq!(objs[1].target, Some(ItemId(2)));
    }

    #[test]
    fn script_links_bind_fields_without_duplicating_the_record() {
        let mut d = decls();
        let mut objs = Vec::new();
        run(&mut d, &mut objs, ("T", "isActive", "S", "touched"));
        run(&mut d, &mut objs, ("T2", "isActive", "S", "touched"));
        let out = run(&mut d, &mut objs, ("S", "pos", "Box", "translation"));
        assert_eq!(out, LinkOutcome::Merged { object: ObjectId(0) });
        assert_eq!(objs.len(), 1);
        assert_eq!(objs[0].trigger, Some(TriggerId(0)));
        assert_eq!(objs[0].target, Some(ItemId(0)));

        let s = d.scripts.get(ScriptId(0)).unwrap();
        assert_eq!(s.inputs.len(), 1);
        assert_eq!(s.outputs.len(), 1);
        assert_eq!(s.outputs[0].1.end, BindingEnd::Item(ItemId(0)));
    }

    #[test]
    fn script_to_timer_does_not_fill_the_timer_slot() {
        let mut d = decls();
        let mut objs = Vec::new();
        run(&mut d, &mut objs, ("T", "isActive", "S", "touched"));
        run(&mut d, &mut objs, ("S", "pos", "Clock", "cycleInterval"));
        assert_eq!(objs[0].timer, None);
    }

    #[test]
    fn unresolved_and_unsupported_links_add_nothing() {
        let mut d = decls();
        let mut objs = Vec::new();
        assert_eq!(
            run(&mut d, &mut objs, ("Ghost", "x", "Box", "translation")),
            LinkOutcome::Unresolved {
                side: LinkSide::From
            }
        );
        assert_eq!(
            run(&mut d, &mut objs, ("T", "isActive", "Nowhere", "x")),
            LinkOutcome::Unresolved { side: LinkSide::To }
        );
        assert_eq!(
            run(&mut d, &mut objs, ("Box", "translation", "Lamp", "on")),
            LinkOutcome::Unsupported
        );
        assert_eq!(
            run(&mut d, &mut objs, ("G", "toggle", "T", "enabled")),
            LinkOutcome::Unsupported
        );
        assert!(objs.is_empty());
    }

    #[test]
    fn object_count_is_monotone_and_slots_stable() {
        let mut d = decls();
        let mut objs: Vec<InteractiveObject> = Vec::new();
        let links = [
            ("T", "isOver", "G", "toggle"),
            ("T2", "isActive", "G", "toggle"),
            ("G", "toggle", "Lamp", "on"),
            ("T", "touchTime", "Clock", "startTime"),
            ("Clock", "fraction_changed", "Move", "set_fraction"),
            ("Move", "value_changed", "Box", "translation"),
            ("Move", "value_changed", "Lamp2", "translation"),
            ("T2", "isActive", "S", "touched"),
            ("S", "pos", "Box", "translation"),
            ("Clock", "fraction_changed", "Turn", "set_fraction"),
        ];
        let mut snapshots: Vec<InteractiveObject> = Vec::new();
        for l in links {
            run(&mut d, &mut objs, l);
            assert!(objs.len() >= snapshots.len());
            for (before, now) in snapshots.iter().zip(objs.iter()) {
                for (a, b) in [
                    (before.trigger.map(|x| x.0), now.trigger.map(|x| x.0)),
                    (before.timer.map(|x| x.0), now.timer.map(|x| x.0)),
                    (before.interpolator.map(|x| x.0), now.interpolator.map(|x| x.0)),
                    (before.toggle.map(|x| x.0), now.toggle.map(|x| x.0)),
                    (before.script.map(|x| x.0), now.script.map(|x| x.0)),
                    (before.target.map(|x| x.0), now.target.map(|x| x.0)),
                ] {
                    if a.is_some() {
                        assert_eq!(a, b);
                    }
                }
            }
            snapshots = objs.clone();
        }
    }
}
