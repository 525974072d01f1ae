use serde_json::to_string_pretty;
use scenewire_interact::{load_document, InteractConfig, MemoryScene, NullRuntime, TriggerEvent};

fn main() -> anyhow::Result<()> {
    // Lamp and porch light share one toggle flipped by hovering the switch.
    let json = scenewire_test_fixtures::scenes::json("touch-toggle")?;
    let mut host = MemoryScene::new();
    let (mut ix, report) =
        load_document(&json, InteractConfig::default(), &mut host, &mut NullRuntime)?;

    for (object, kind) in &report.behaviors {
        println!("object {} -> {:?}", object.0, kind);
    }

    for over in [true, true, false, true] {
        let out = ix.on_trigger("T", TriggerEvent::over(over), &mut host, &mut NullRuntime);
        println!(
            "over={over} toggle={:?} writes:\n{}",
            ix.toggle_state("G"),
            to_string_pretty(&out.writes)?
        );
    }
    Ok(())
}
