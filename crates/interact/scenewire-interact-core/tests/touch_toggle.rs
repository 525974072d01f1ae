use scenewire_api_core::Value;
use scenewire_interact::{
    BehaviorKind, Interactivity, MemoryScene, NullRuntime, ObjectId, SceneDocument, Toggle,
    Trigger, TriggerEvent, TriggerKind,
};

fn over(ix: &mut Interactivity, host: &mut MemoryScene, on: bool) {
    ix.on_trigger("T", TriggerEvent::over(on), host, &mut NullRuntime);
}

#[test]
fn over_edges_flip_the_toggle_once_per_edge() {
    let mut ix = Interactivity::default();
    ix.declare_trigger(Trigger::new("T", "N", TriggerKind::Touch));
    ix.declare_toggle(Toggle::new("G", false));
    ix.link("T", "isOver", "G", "toggle");

    let mut host = MemoryScene::new();
    let report = ix.compile(&mut host, &mut NullRuntime);
    assert_eq!(report.behavior(ObjectId(0)), Some(BehaviorKind::ToggleFlip));
    assert_eq!(host.collider_owners, vec!["N".to_string()]);

    over(&mut ix, &mut host, true);
    assert_eq!(ix.toggle_state("G"), Some(true));

    // Polling the same state is not an edge.
    over(&mut ix, &mut host, true);
    over(&mut ix, &mut host, true);
    assert_eq!(ix.toggle_state("G"), Some(true));

    over(&mut ix, &mut host, false);
    assert_eq!(ix.toggle_state("G"), Some(true));
    over(&mut ix, &mut host, true);
    assert_eq!(ix.toggle_state("G"), Some(false));
}

#[test]
fn toggle_binding_propagates_to_every_target() {
    let json = scenewire_test_fixtures::scenes::json("touch-toggle").unwrap();
    let doc = SceneDocument::from_json(&json).unwrap();
    let mut ix = Interactivity::default();
    doc.apply(&mut ix).unwrap();

    let mut host = MemoryScene::new();
    let report = ix.compile(&mut host, &mut NullRuntime);
    assert_eq!(report.behavior(ObjectId(0)), Some(BehaviorKind::ToggleBinding));
    // The second target's {toggle, target} record runs only through propagation.
    assert_eq!(report.skipped, vec![ObjectId(1)]);

    let out = ix.on_trigger("T", TriggerEvent::over(true), &mut host, &mut NullRuntime);
    assert_eq!(out.flipped.len(), 1);
    assert_eq!(host.get("Lamp.on"), Some(&Value::Bool(true)));
    assert_eq!(host.get("PorchLight.on"), Some(&Value::Bool(true)));
    assert_eq!(out.writes.len(), 2);

    ix.on_trigger("T", TriggerEvent::over(false), &mut host, &mut NullRuntime);
    ix.on_trigger("T", TriggerEvent::over(true), &mut host, &mut NullRuntime);
    assert_eq!(host.get("Lamp.on"), Some(&Value::Bool(false)));
    assert_eq!(host.get("PorchLight.on"), Some(&Value::Bool(false)));
}

#[test]
fn disabled_triggers_ignore_events() {
    let mut ix = Interactivity::default();
    ix.declare_trigger(Trigger::new("T", "N", TriggerKind::Touch));
    ix.declare_toggle(Toggle::new("G", false));
    ix.link("T", "isActive", "G", "toggle");
    let mut host = MemoryScene::new();
    ix.compile(&mut host, &mut NullRuntime);

    assert!(ix.set_trigger_enabled("t", false));
    ix.on_trigger("T", TriggerEvent::pressed(None), &mut host, &mut NullRuntime);
    assert_eq!(ix.toggle_state("G"), Some(false));

    ix.set_trigger_enabled("T", true);
    ix.on_trigger("T", TriggerEvent::pressed(None), &mut host, &mut NullRuntime);
    assert_eq!(ix.toggle_state("G"), Some(true));
    assert!(!ix.set_trigger_enabled("missing", true));
}

#[test]
fn touch_bridge_flips_lights_and_starts_media() {
    use scenewire_interact::{DefinedItem, TargetKind};

    let mut ix = Interactivity::default();
    ix.declare_trigger(Trigger::new("Switch", "Wall", TriggerKind::Touch));
    ix.declare_trigger(Trigger::new("Play", "Screen", TriggerKind::Touch));
    ix.declare_item(DefinedItem::new("Lamp", TargetKind::Light, "Lamp"));
    ix.declare_item(DefinedItem::new("Movie", TargetKind::VideoPlayer, "Movie"));
    ix.link("Switch", "touchTime", "Lamp", "on");
    ix.link("Play", "touchTime", "Movie", "startTime");

    let mut host = MemoryScene::new();
    let report = ix.compile(&mut host, &mut NullRuntime);
    assert_eq!(report.collider_owners.len(), 2);

    ix.on_trigger("Switch", TriggerEvent::pressed(None), &mut host, &mut NullRuntime);
    assert_eq!(host.get("Lamp.on"), Some(&Value::Bool(true)));
    ix.on_trigger("Switch", TriggerEvent::released(), &mut host, &mut NullRuntime);
    ix.on_trigger("Switch", TriggerEvent::pressed(None), &mut host, &mut NullRuntime);
    assert_eq!(host.get("Lamp.on"), Some(&Value::Bool(false)));

    ix.on_trigger("Play", TriggerEvent::pressed(None), &mut host, &mut NullRuntime);
    assert_eq!(host.get("Movie.media"), Some(&Value::Text("start".into())));
}

#[test]
fn second_compile_is_a_no_op() {
    let mut ix = Interactivity::default();
    ix.declare_trigger(Trigger::new("T", "N", TriggerKind::Touch));
    ix.declare_toggle(Toggle::new("G", false));
    ix.link("T", "isOver", "G", "toggle");
    let mut host = MemoryScene::new();
    assert_eq!(ix.compile(&mut host, &mut NullRuntime).behaviors.len(), 1);
    assert!(ix.compile(&mut host, &mut NullRuntime).behaviors.is_empty());
    assert_eq!(host.collider_owners.len(), 1);
}
