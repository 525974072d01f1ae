//! Scene-graph host boundary.
//!
//! The host owns nodes, lights, materials, media players and the camera. The
//! interactivity core only reads and writes a small set of properties by
//! `TypedPath` and issues a handful of requests. Hosts implement this trait
//! on whatever engine they drive; `scenewire-interact-core` ships an
//! in-memory implementation for headless use.

use crate::{TypedPath, Value, WriteOp};

/// Canonical property field names used in `TypedPath::field`.
pub mod props {
    /// Node translation, `Value::Vec3`.
    pub const TRANSLATION: &str = "translation";
    /// Node rotation in the host's native form, `Value::Quat`.
    pub const ROTATION: &str = "rotation";
    /// Node scale, `Value::Vec3`.
    pub const SCALE: &str = "scale";
    /// Light / switch enable flag, `Value::Bool`.
    pub const ON: &str = "on";
    /// Light intensity, `Value::Float`.
    pub const INTENSITY: &str = "intensity";
    /// Light color, `Value::Color`.
    pub const COLOR: &str = "color";
    /// Directional light direction, `Value::Vec3`.
    pub const DIRECTION: &str = "direction";
    pub const DIFFUSE_COLOR: &str = "diffuseColor";
    pub const SPECULAR_COLOR: &str = "specularColor";
    pub const EMISSIVE_COLOR: &str = "emissiveColor";
    /// Material transparency, `Value::Float`.
    pub const TRANSPARENCY: &str = "transparency";
    /// Texture transform matrix (3x3 row-major), `Value::Vector` of 9.
    pub const TEXTURE_MATRIX: &str = "matrix";
    /// Media player command, `Value::Text` of `start`, `pause` or `stop`.
    pub const MEDIA: &str = "media";
    /// Text object content, `Value::Text`.
    pub const TEXT: &str = "string";
    /// Switch child index, `Value::Int` (-1 hides all).
    pub const WHICH_CHOICE: &str = "whichChoice";
}

pub trait SceneHost {
    /// Read a property. `None` when the node or property is unknown.
    fn read(&self, path: &TypedPath) -> Option<Value>;

    /// Write a property. Unknown nodes are the host's concern to ignore.
    fn write(&mut self, op: WriteOp);

    /// Attach hit-testable colliders to every descendant of `owner`.
    fn attach_colliders(&mut self, owner: &str);

    /// Replace the current scene with the one at `url`.
    fn load_scene(&mut self, url: &str);

    /// Show a document URL on the host's content surface.
    fn open_document(&mut self, url: &str);

    /// Current camera look direction (unit vector, world space).
    fn camera_look_direction(&self) -> [f32; 3];

    /// Current main-camera position.
    fn camera_position(&self) -> [f32; 3];

    /// Reposition the main camera and the input-ray origin.
    fn place_camera(&mut self, position: [f32; 3], orientation: [f32; 4]);
}
