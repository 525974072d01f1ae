use scenewire_api_core::Value;
use scenewire_interact::{
    BehaviorKind, FrameTask, InteractConfig, Interactivity, MemoryScene, NullRuntime, ObjectId,
    SceneDocument, TriggerEvent,
};

fn door() -> (Interactivity, MemoryScene) {
    door_with(InteractConfig::default())
}

fn door_with(cfg: InteractConfig) -> (Interactivity, MemoryScene) {
    let json = scenewire_test_fixtures::scenes::json("door-animation").unwrap();
    let doc = SceneDocument::from_json(&json).unwrap();
    let mut ix = Interactivity::new(cfg);
    let outcomes = doc.apply(&mut ix).unwrap();
    // All three links land in the same record.
    assert!(outcomes.iter().all(|o| o.object() == Some(ObjectId(0))));
    let mut host = MemoryScene::new();
    let report = ix.compile(&mut host, &mut NullRuntime);
    assert_eq!(
        report.behavior(ObjectId(0)),
        Some(BehaviorKind::KeyframeAnimation)
    );
    (ix, host)
}

fn press(ix: &mut Interactivity, host: &mut MemoryScene) {
    ix.on_trigger("Handle", TriggerEvent::released(), host, &mut NullRuntime);
    ix.on_trigger("Handle", TriggerEvent::pressed(None), host, &mut NullRuntime);
}

fn door_x(host: &MemoryScene) -> f32 {
    match host.get("Door.translation") {
        Some(Value::Vec3(v)) => v[0],
        other => panic!("unexpected door translation {other:?}"),
    }
}

#[test]
fn keys_scale_by_the_cycle_interval() {
    let (ix, host) = door();
    let clip = ix.clip_for(ObjectId(0)).unwrap();
    assert_eq!(clip.duration, 2.0);
    let times: Vec<f32> = clip.tracks[0].points.iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0]);
    assert_eq!(host.collider_owners, vec!["Door".to_string()]);
}

#[test]
fn triggered_animation_plays_once_and_clears_its_guard() {
    let (mut ix, mut host) = door();

    let idle = ix.tick(0.5, &mut host, &mut NullRuntime);
    assert!(idle.writes.is_empty());
    assert!(!ix.animation_running(ObjectId(0)));

    press(&mut ix, &mut host);
    assert!(ix.animation_running(ObjectId(0)));
    ix.tick(0.5, &mut host, &mut NullRuntime);
    assert!((door_x(&host) - 0.5).abs() < 1e-5);

    // A second press mid-flight does not restart.
    press(&mut ix, &mut host);
    ix.tick(0.5, &mut host, &mut NullRuntime);
    assert!((door_x(&host) - 1.0).abs() < 1e-5);

    let end = ix.tick(1.5, &mut host, &mut NullRuntime);
    assert!((door_x(&host) - 2.0).abs() < 1e-5);
    assert_eq!(end.finished, vec![ObjectId(0)]);
    assert!(!ix.animation_running(ObjectId(0)));
    assert!(ix.scheduler().is_empty());

    let quiet = ix.tick(0.5, &mut host, &mut NullRuntime);
    assert!(quiet.writes.is_empty());

    // Finished animations can be triggered again from the start.
    press(&mut ix, &mut host);
    ix.tick(0.5, &mut host, &mut NullRuntime);
    assert!((door_x(&host) - 0.5).abs() < 1e-5);
}

#[test]
fn guard_clears_when_the_end_event_is_capped() {
    let mut cfg = InteractConfig::default();
    cfg.animation.max_events_per_tick = 1;
    let (mut ix, mut host) = door_with(cfg);

    press(&mut ix, &mut host);
    // Start and end land in one tick; only the start event fits.
    let frame = ix.tick(5.0, &mut host, &mut NullRuntime);
    assert_eq!(frame.events.len(), 1);
    assert_eq!(frame.finished, vec![ObjectId(0)]);
    assert!(!ix.animation_running(ObjectId(0)));
    assert!(ix.scheduler().is_empty());

    press(&mut ix, &mut host);
    assert!(ix.animation_running(ObjectId(0)));
    ix.tick(0.5, &mut host, &mut NullRuntime);
    assert!((door_x(&host) - 0.5).abs() < 1e-5);
}

#[test]
fn untriggered_animations_start_at_compile() {
    use scenewire_interact::{
        DefinedItem, Interpolator, InterpolatorKind, TargetKind, Timer,
    };

    let mut ix = Interactivity::default();
    ix.declare_timer(Timer::new("Clock", 4.0, true));
    ix.declare_interpolator(Interpolator::new(
        "Spin",
        InterpolatorKind::Orientation,
        vec![0.0, 1.0],
        vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 3.0],
    ));
    ix.declare_item(DefinedItem::new("Wheel", TargetKind::SceneNode, "Wheel"));
    ix.link("Clock", "fraction_changed", "Spin", "set_fraction");
    ix.link("Spin", "value_changed", "Wheel", "set_rotation");

    let mut host = MemoryScene::new();
    ix.compile(&mut host, &mut NullRuntime);
    assert!(ix.animation_running(ObjectId(0)));
    assert_eq!(ix.scheduler().len(), 1);
    assert!(host.collider_owners.is_empty());

    let frame = ix.tick(1.0, &mut host, &mut NullRuntime);
    assert!(!frame.writes.is_empty());
    assert!(host.get("Wheel.rotation").is_some());
    // Looping players never finish.
    let later = ix.tick(10.0, &mut host, &mut NullRuntime);
    assert!(later.finished.is_empty());
    assert!(matches!(
        ix.scheduler().iter().next(),
        Some(FrameTask::Animation(_))
    ));
}
