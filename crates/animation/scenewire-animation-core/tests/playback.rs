use scenewire_animation_core::{
    Clip, CoreEvent, Engine, Inputs, Keypoint, LoopMode, PlayerCommand, PlayerState, Track, Value,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn slide_clip() -> Clip {
    // Keys [0, 0.5, 1] scaled by a 2 second cycle.
    Clip::new("slide", 2.0).with_track(Track {
        target: "Box.translation".into(),
        points: vec![
            Keypoint::new(0.0, Value::vec3(0.0, 0.0, 0.0)),
            Keypoint::new(1.0, Value::vec3(1.0, 0.0, 0.0)),
            Keypoint::new(2.0, Value::vec3(1.0, 2.0, 0.0)),
        ],
    })
}

fn x_of(engine_out: &[scenewire_animation_core::Change]) -> [f32; 3] {
    match &engine_out[0].value {
        Value::Vec3(v) => *v,
        other => panic!("expected vec3, got {other:?}"),
    }
}

#[test]
fn stopped_player_emits_nothing() {
    let mut eng = Engine::default();
    let clip = eng.load_clip(slide_clip());
    let _p = eng.create_player("slide", clip, LoopMode::Once);
    let out = eng.update(0.5, Inputs::default());
    assert!(out.is_empty());
}

#[test]
fn once_player_samples_in_seconds_and_ends() {
    let mut eng = Engine::default();
    let clip = eng.load_clip(slide_clip());
    let p = eng.create_player("slide", clip, LoopMode::Once);

    let out = eng.update(0.5, Inputs::with(PlayerCommand::Play { player: p }));
    assert!(matches!(out.events[0], CoreEvent::PlaybackStarted { .. }));
    approx(x_of(&out.changes)[0], 0.5, 1e-5);

    let out = eng.update(1.0, Inputs::default());
    let v = x_of(&out.changes);
    approx(v[0], 1.0, 1e-5);
    approx(v[1], 1.0, 1e-5);

    let out = eng.update(5.0, Inputs::default());
    let v = x_of(&out.changes);
    approx(v[1], 2.0, 1e-5);
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, CoreEvent::PlaybackEnded { .. })));
    assert_eq!(eng.player(p).map(|p| p.state), Some(PlayerState::Ended));

    let out = eng.update(0.1, Inputs::default());
    assert!(out.changes.is_empty());
}

#[test]
fn loop_player_wraps() {
    let mut eng = Engine::default();
    let clip = eng.load_clip(slide_clip());
    let p = eng.create_player("slide", clip, LoopMode::Loop);
    eng.update(0.0, Inputs::with(PlayerCommand::Play { player: p }));
    let out = eng.update(2.5, Inputs::default());
    approx(x_of(&out.changes)[0], 0.5, 1e-5);
    assert!(out.events.is_empty());
    assert!(eng.is_playing(p));
}

#[test]
fn play_after_end_restarts_and_pause_resumes() {
    let mut eng = Engine::default();
    let clip = eng.load_clip(slide_clip());
    let p = eng.create_player("slide", clip, LoopMode::Once);
    eng.update(0.0, Inputs::with(PlayerCommand::Play { player: p }));
    eng.update(3.0, Inputs::default());
    assert!(!eng.is_playing(p));

    let out = eng.update(0.25, Inputs::with(PlayerCommand::Play { player: p }));
    approx(x_of(&out.changes)[0], 0.25, 1e-5);

    eng.update(0.0, Inputs::with(PlayerCommand::Pause { player: p }));
    assert_eq!(eng.player(p).map(|p| p.state), Some(PlayerState::Paused));
    let out = eng.update(0.25, Inputs::with(PlayerCommand::Play { player: p }));
    approx(x_of(&out.changes)[0], 0.5, 1e-5);
}
