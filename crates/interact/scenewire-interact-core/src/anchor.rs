//! Anchor navigation: scene replace, viewpoint jump or document display.

use log::{error, info};
use serde::{Deserialize, Serialize};

use scenewire_api_core::SceneHost;

use crate::config::InteractConfig;
use crate::decl::Declarations;
use crate::defined_item::TargetKind;

/// What an anchor activation did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Navigation {
    LoadScene(String),
    Viewpoint(String),
    Document(String),
    /// `#name` with no matching viewpoint.
    MissingViewpoint(String),
    /// Document urls are disabled by configuration.
    Ignored(String),
}

/// Strip surrounding quote characters.
pub fn clean_url<'a>(url: &'a str, quotes: &[char]) -> &'a str {
    url.trim().trim_matches(|c| quotes.contains(&c)).trim()
}

pub fn navigate(
    url: &str,
    cfg: &InteractConfig,
    decls: &Declarations,
    host: &mut dyn SceneHost,
) -> Navigation {
    let url = clean_url(url, &cfg.anchor_quote_chars);
    if cfg.is_scene_url(url) {
        info!("anchor: loading scene '{url}'");
        host.load_scene(url);
        return Navigation::LoadScene(url.to_string());
    }
    if let Some(name) = url.strip_prefix('#') {
        let found = decls.items.iter().find_map(|(_, item)| match &item.kind {
            TargetKind::Viewpoint {
                position,
                orientation,
            } if item.name.eq_ignore_ascii_case(name) => Some((*position, *orientation)),
            _ => None,
        });
        return match found {
            Some((position, orientation)) => {
                info!("anchor: moving to viewpoint '{name}'");
                host.place_camera(position, orientation.to_quat());
                Navigation::Viewpoint(name.to_string())
            }
            None => {
                error!("anchor: viewpoint '{name}' not found");
                Navigation::MissingViewpoint(name.to_string())
            }
        };
    }
    if !cfg.open_documents {
        return Navigation::Ignored(url.to_string());
    }
    info!("anchor: opening document '{url}'");
    host.open_document(url);
    Navigation::Document(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defined_item::DefinedItem;
    use crate::scene_store::MemoryScene;
    use scenewire_api_core::AxisAngle;

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(clean_url(" \"room.x3d\" ", &['"', '\'']), "room.x3d");
        assert_eq!(clean_url("'#Top'", &['"', '\'']), "#Top");
    }

    #[test]
    fn routes_by_url_shape() {
        let cfg = InteractConfig::default();
        let mut d = Declarations::new();
        d.items.insert(
            "Top",
            DefinedItem::new(
                "Top",
                TargetKind::Viewpoint {
                    position: [0.0, 10.0, 0.0],
                    orientation: AxisAngle::IDENTITY,
                },
                "Top",
            ),
        );
        let mut host = MemoryScene::new();

        assert_eq!(
            navigate("\"next.X3D\"", &cfg, &d, &mut host),
            Navigation::LoadScene("next.X3D".into())
        );
        assert_eq!(host.loaded_scenes, vec!["next.X3D".to_string()]);

        assert_eq!(
            navigate("#top", &cfg, &d, &mut host),
            Navigation::Viewpoint("top".into())
        );
        assert_eq!(host.camera_placements[0].position, [0.0, 10.0, 0.0]);

        assert_eq!(
            navigate("#Nowhere", &cfg, &d, &mut host),
            Navigation::MissingViewpoint("Nowhere".into())
        );
        assert_eq!(
            navigate("https://example.org/doc.html", &cfg, &d, &mut host),
            Navigation::Document("https://example.org/doc.html".into())
        );
        assert_eq!(host.documents.len(), 1);
    }
}
