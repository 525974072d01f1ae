use scenewire_api_core::Value;
use scenewire_interact::{
    load_document, BehaviorKind, InteractConfig, Interactivity, MemoryScene, ObjectId, ScriptMode,
    TriggerEvent,
};
use scenewire_script_rhai::RhaiRuntime;

/// One drag sensor feeding script `S`, whose `out` drives `Box`.
fn scene(trigger: &str, from: &str, ty: &str, to: &str) -> String {
    format!(
        r#"{{
        "triggers": [ {trigger} ],
        "scripts": [ {{
            "name": "S",
            "fields": [
                {{ "name": "dragged", "access": "inputOnly", "type": "{ty}" }},
                {{ "name": "out", "access": "outputOnly", "type": "{ty}" }}
            ],
            "source": "fn dragged(v) {{ this.out = v; }}"
        }} ],
        "items": [ {{ "name": "Box", "kind": "sceneNode" }} ],
        "links": [
            {{ "fromNode": "Grip", "fromField": "{from}", "toNode": "S", "toField": "dragged" }},
            {{ "fromNode": "S", "fromField": "out", "toNode": "Box", "toField": "{to}" }}
        ]
    }}"#
    )
}

fn compile(json: &str, mode: ScriptMode) -> (Interactivity, MemoryScene, RhaiRuntime) {
    let mut host = MemoryScene::new();
    host.set_camera_position([0.0, 0.0, 5.0]);
    host.set_look_direction([0.0, 0.0, -1.0]);
    let mut rt = RhaiRuntime::default();
    let (ix, report) = load_document(json, InteractConfig::default(), &mut host, &mut rt).unwrap();
    assert!(report.script_failures.is_empty());
    assert_eq!(
        report.behavior(ObjectId(0)),
        Some(BehaviorKind::ScriptInvocation(mode))
    );
    (ix, host, rt)
}

fn grab(ix: &mut Interactivity, host: &mut MemoryScene, rt: &mut RhaiRuntime, hit: [f32; 3]) {
    ix.on_trigger("Grip", TriggerEvent::pressed(Some(hit)), host, rt);
    assert!(ix.drag_session().is_some());
}

fn close(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
}

fn quat_about_y(angle: f32) -> [f32; 4] {
    let half = angle * 0.5;
    [0.0, half.sin(), 0.0, half.cos()]
}

#[test]
fn plane_drag_translation_reaches_the_script() {
    let json = scene(
        r#"{ "name": "Grip", "owner": "Box", "kind": "plane",
             "minPosition": [-1.0, -1.0], "maxPosition": [1.0, 1.0] }"#,
        "translation_changed",
        "SFVec3f",
        "set_translation",
    );
    let (mut ix, mut host, mut rt) = compile(&json, ScriptMode::Plane);
    grab(&mut ix, &mut host, &mut rt, [0.0, 0.0, 1.0]);

    // Pressing arms the drag; the script only runs on frames.
    assert!(host.get("Box.translation").is_none());

    host.set_look_direction([0.1, 0.05, -1.0]);
    let frame = ix.tick(0.016, &mut host, &mut rt);
    assert!(frame.script_errors.is_empty(), "{:?}", frame.script_errors);
    match host.get("Box.translation") {
        Some(Value::Vec3(v)) => assert!(close(v, &[0.4, 0.2, 0.0]), "{v:?}"),
        other => panic!("unexpected translation {other:?}"),
    }

    ix.on_trigger("Grip", TriggerEvent::released(), &mut host, &mut rt);
    host.set_look_direction([0.5, 0.5, -1.0]);
    let idle = ix.tick(0.016, &mut host, &mut rt);
    assert!(idle.writes.is_empty());
}

#[test]
fn sphere_drag_rotation_reaches_the_script() {
    let json = scene(
        r#"{ "name": "Grip", "owner": "Box", "kind": "sphere" }"#,
        "rotation_changed",
        "SFRotation",
        "set_rotation",
    );
    let (mut ix, mut host, mut rt) = compile(&json, ScriptMode::Sphere);
    grab(&mut ix, &mut host, &mut rt, [0.0, 0.0, 1.0]);

    // A sideways look of 0.3 turns 0.3 rad about +Y.
    host.set_look_direction([0.3, 0.0, -1.0]);
    let frame = ix.tick(0.016, &mut host, &mut rt);
    assert!(frame.script_errors.is_empty(), "{:?}", frame.script_errors);
    match host.get("Box.rotation") {
        Some(Value::Quat(q)) => assert!(close(q, &quat_about_y(0.3)), "{q:?}"),
        other => panic!("unexpected rotation {other:?}"),
    }
}

#[test]
fn cylinder_drag_rotation_reaches_the_script() {
    let json = scene(
        r#"{ "name": "Grip", "owner": "Box", "kind": "cylinder",
             "minAngle": 0.0, "maxAngle": 1.0, "axis": [0.0, 1.0, 0.0] }"#,
        "rotation_changed",
        "SFRotation",
        "set_rotation",
    );
    let (mut ix, mut host, mut rt) = compile(&json, ScriptMode::Cylinder);
    grab(&mut ix, &mut host, &mut rt, [0.0, 0.0, 1.0]);

    // Looking from -Z toward -X-Z is a quarter-pi turn about +Y.
    host.set_look_direction([-1.0, 0.0, -1.0]);
    let frame = ix.tick(0.016, &mut host, &mut rt);
    assert!(frame.script_errors.is_empty(), "{:?}", frame.script_errors);
    match host.get("Box.rotation") {
        Some(Value::Quat(q)) => {
            assert!(close(q, &quat_about_y(std::f32::consts::FRAC_PI_4)), "{q:?}")
        }
        other => panic!("unexpected rotation {other:?}"),
    }
}
