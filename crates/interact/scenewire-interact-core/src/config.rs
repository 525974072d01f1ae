//! Interactivity configuration.

use serde::{Deserialize, Serialize};

/// Runtime knobs for link compilation and dispatch. Loads from JSON; missing
/// keys take their defaults.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractConfig {
    /// Anchor destinations ending in one of these (case-insensitive) replace
    /// the current scene instead of opening a document.
    pub scene_extensions: Vec<String>,

    /// Characters stripped from both ends of an anchor destination.
    pub anchor_quote_chars: Vec<char>,

    /// Attach hit-testable colliders under every trigger owner at compile time.
    pub attach_colliders: bool,

    /// Hand non-scene, non-viewpoint anchor destinations to the host's
    /// document surface. When false they are logged and dropped.
    pub open_documents: bool,

    /// Sizing for the keyframe engine.
    pub animation: scenewire_animation_core::Config,
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            scene_extensions: vec![".x3d".to_string()],
            anchor_quote_chars: vec!['"', '\''],
            attach_colliders: true,
            open_documents: true,
            animation: scenewire_animation_core::Config::default(),
        }
    }
}

impl InteractConfig {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn is_scene_url(&self, url: &str) -> bool {
        let lower = url.to_ascii_lowercase();
        self.scene_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let cfg = InteractConfig::from_json(r#"{ "attach_colliders": false }"#).unwrap();
        assert!(!cfg.attach_colliders);
        assert_eq!(cfg.scene_extensions, vec![".x3d".to_string()]);
        assert!(cfg.is_scene_url("rooms/Hall.X3D"));
        assert!(!cfg.is_scene_url("https://example.org/index.html"));
    }
}
