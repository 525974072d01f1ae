//! Tolerant field-name matching.
//!
//! Markup field names come as `translation`, `set_translation`,
//! `translation_changed` or engine spellings like `diffuseColor`. Matching is
//! case-insensitive on the trimmed name with `set_` / `_changed` stripped;
//! aliases of four or more characters also match by prefix or suffix.

use serde::{Deserialize, Serialize};

fn normalize(field: &str) -> String {
    let lower = field.trim().to_ascii_lowercase();
    let s = lower.strip_prefix("set_").unwrap_or(&lower);
    let s = s.strip_suffix("_changed").unwrap_or(s);
    s.to_string()
}

/// True when `field` names `alias` under the tolerant rules.
pub fn field_matches(field: &str, alias: &str) -> bool {
    let norm = normalize(field);
    let alias = alias.to_ascii_lowercase();
    norm == alias || (alias.len() >= 4 && (norm.ends_with(&alias) || norm.starts_with(&alias)))
}

/// Scene-target property addressed by a link field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Translation,
    Rotation,
    Scale,
    Center,
    DiffuseColor,
    SpecularColor,
    EmissiveColor,
    Transparency,
    Intensity,
    Color,
    Direction,
    WhichChoice,
    Text,
    MediaStart,
    MediaPause,
    MediaStop,
    On,
}

// Specific names precede the generic ones they end with.
const TABLE: &[(Property, &[&str])] = &[
    (Property::DiffuseColor, &["diffusecolor"]),
    (Property::SpecularColor, &["specularcolor"]),
    (Property::EmissiveColor, &["emissivecolor"]),
    (Property::Translation, &["translation", "position"]),
    (Property::Rotation, &["rotation", "orientation"]),
    (Property::Scale, &["scale"]),
    (Property::Center, &["center"]),
    (Property::Transparency, &["transparency"]),
    (Property::Intensity, &["intensity"]),
    (Property::Direction, &["direction"]),
    (Property::WhichChoice, &["whichchoice"]),
    (Property::MediaStart, &["starttime"]),
    (Property::MediaPause, &["pausetime"]),
    (Property::MediaStop, &["stoptime"]),
    (Property::Color, &["color"]),
    (Property::Text, &["string"]),
    (Property::On, &["on", "enabled"]),
];

impl Property {
    pub fn from_field(field: &str) -> Option<Property> {
        TABLE
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| field_matches(field, a)))
            .map(|(p, _)| *p)
    }

    /// Keyframe channels: translation, rotation, scale.
    pub fn is_channel(self) -> bool {
        matches!(
            self,
            Property::Translation | Property::Rotation | Property::Scale
        )
    }
}

/// What a trigger's output field means to a drag session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragField {
    Translation,
    TrackPoint,
    Rotation,
    Other,
}

impl DragField {
    pub fn from_field(field: Option<&str>) -> DragField {
        match field {
            Some(f) if field_matches(f, "trackpoint") => DragField::TrackPoint,
            Some(f) if field_matches(f, "translation") => DragField::Translation,
            Some(f) if field_matches(f, "rotation") => DragField::Rotation,
            _ => DragField::Other,
        }
    }
}
