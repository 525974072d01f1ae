use scenewire_interact::{
    BehaviorKind, InteractConfig, MemoryScene, Navigation, NullRuntime, ObjectId, TriggerEvent,
};

fn compiled(cfg: InteractConfig) -> (scenewire_interact::Interactivity, MemoryScene) {
    let json = scenewire_test_fixtures::scenes::json("anchors").unwrap();
    let mut host = MemoryScene::new();
    let (ix, report) =
        scenewire_interact::load_document(&json, cfg, &mut host, &mut NullRuntime).unwrap();
    assert_eq!(report.behaviors.len(), 3);
    assert!(report
        .behaviors
        .iter()
        .all(|(_, k)| *k == BehaviorKind::AnchorNavigation));
    assert_eq!(report.behavior(ObjectId(2)), Some(BehaviorKind::AnchorNavigation));
    (ix, host)
}

fn click(
    ix: &mut scenewire_interact::Interactivity,
    host: &mut MemoryScene,
    name: &str,
) -> Vec<Navigation> {
    ix.on_trigger(name, TriggerEvent::pressed(None), host, &mut NullRuntime)
        .navigations
}

#[test]
fn anchors_route_by_url_shape() {
    let (mut ix, mut host) = compiled(InteractConfig::default());
    assert_eq!(host.collider_owners, vec!["Sign", "Door", "Kiosk"]);

    assert_eq!(
        click(&mut ix, &mut host, "ToTop"),
        vec![Navigation::Viewpoint("Top".into())]
    );
    assert_eq!(host.camera_placements.len(), 1);
    assert_eq!(host.camera_placements[0].position, [0.0, 12.0, 0.0]);

    assert_eq!(
        click(&mut ix, &mut host, "NextRoom"),
        vec![Navigation::LoadScene("rooms/next.x3d".into())]
    );
    assert_eq!(host.loaded_scenes, vec!["rooms/next.x3d"]);

    assert_eq!(
        click(&mut ix, &mut host, "Help"),
        vec![Navigation::Document("https://example.org/help.html".into())]
    );
    assert_eq!(host.documents.len(), 1);
}

#[test]
fn held_pointer_navigates_once() {
    let (mut ix, mut host) = compiled(InteractConfig::default());
    click(&mut ix, &mut host, "NextRoom");
    assert!(click(&mut ix, &mut host, "NextRoom").is_empty());
    assert_eq!(host.loaded_scenes.len(), 1);
}

#[test]
fn documents_can_be_disabled() {
    let cfg = InteractConfig {
        open_documents: false,
        ..InteractConfig::default()
    };
    let (mut ix, mut host) = compiled(cfg);
    assert_eq!(
        click(&mut ix, &mut host, "Help"),
        vec![Navigation::Ignored("https://example.org/help.html".into())]
    );
    assert!(host.documents.is_empty());
}
