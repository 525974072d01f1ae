//! Scene-target bindings and their auxiliary state.
//!
//! The host keeps rotations as quaternions and texture transforms as a bare
//! matrix. Scripts and animation channels need the authored forms back
//! (axis-angle with its exact angle, texture translation/rotation/scale/center),
//! so each item keeps a secondary representation. Every write goes through
//! [`DefinedItem::apply`], which updates the cache and the host together.

use log::{debug, error};
use serde::{Deserialize, Serialize};

use scenewire_api_core::coercion::{to_bool, to_float, to_vec3, to_vector};
use scenewire_api_core::math::{
    axis_angle_from_quat, mat3_mul, mat3_rotation, mat3_scale, mat3_translation, normalize3,
    MAT3_IDENTITY,
};
use scenewire_api_core::{props, AxisAngle, SceneHost, TypedPath, Value, WriteBatch, WriteOp};

use crate::fields::Property;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TargetKind {
    SceneNode,
    Light,
    Switch,
    Material,
    Texture,
    VideoPlayer,
    TextObject,
    Viewpoint {
        position: [f32; 3],
        #[serde(default)]
        orientation: AxisAngle,
    },
}

/// Texture-transform components, plus the matrix they are applied onto.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureTransform {
    pub translation: [f32; 2],
    pub rotation: f32,
    pub scale: [f32; 2],
    pub center: [f32; 2],
    pub original: [f32; 9],
}

impl TextureTransform {
    pub fn new(original: [f32; 9]) -> Self {
        Self {
            translation: [0.0, 0.0],
            rotation: 0.0,
            scale: [1.0, 1.0],
            center: [0.0, 0.0],
            original,
        }
    }

    /// `C⁻¹ · S · R · C · T · original`.
    pub fn matrix(&self) -> [f32; 9] {
        let c_inv = mat3_translation([-self.center[0], -self.center[1]]);
        let s = mat3_scale(self.scale);
        let r = mat3_rotation(self.rotation);
        let c = mat3_translation(self.center);
        let t = mat3_translation(self.translation);
        [s, r, c, t, self.original]
            .into_iter()
            .fold(c_inv, mat3_mul)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuxState {
    pub rotation: Option<AxisAngle>,
    pub light_direction: Option<[f32; 3]>,
    pub texture: Option<TextureTransform>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefinedItem {
    pub name: String,
    #[serde(flatten)]
    pub kind: TargetKind,
    /// Host node reference; defaults to the item's name.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(skip)]
    pub aux: AuxState,
}

fn emit(host: &mut dyn SceneHost, batch: &mut WriteBatch, op: WriteOp) {
    batch.push(op.clone());
    host.write(op);
}

/// Axis-angle from a rotation-ish value. Flat vectors are `(angle, x, y, z)`.
pub fn rotation_of(value: &Value) -> Option<AxisAngle> {
    match value {
        Value::AxisAngle(r) => Some(*r),
        Value::Quat(q) => {
            let (axis, angle) = axis_angle_from_quat(*q);
            Some(AxisAngle::new(axis, angle))
        }
        Value::Vector(v) if v.len() == 4 => Some(AxisAngle::new([v[1], v[2], v[3]], v[0])),
        _ => None,
    }
}

fn vec2_of(value: &Value) -> [f32; 2] {
    let v = to_vector(value);
    [
        v.first().copied().unwrap_or(0.0),
        v.get(1).copied().unwrap_or(0.0),
    ]
}

impl DefinedItem {
    pub fn new(name: &str, kind: TargetKind, target: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            target: Some(target.to_string()),
            aux: AuxState::default(),
        }
    }

    pub fn target_ref(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.name)
    }

    fn path(&self, field: &str) -> TypedPath {
        TypedPath::new(self.target_ref(), field)
    }

    fn texture_mut(&mut self, host: &dyn SceneHost) -> &mut TextureTransform {
        let path = self.path(props::TEXTURE_MATRIX);
        self.aux.texture.get_or_insert_with(|| {
            let original = match host.read(&path) {
                Some(Value::Vector(m)) if m.len() == 9 => {
                    let mut out = [0.0; 9];
                    out.copy_from_slice(&m);
                    out
                }
                _ => MAT3_IDENTITY,
            };
            TextureTransform::new(original)
        })
    }

    /// Write `value` to the property named by `field`, keeping the auxiliary
    /// state in step with the host. Returns false (and logs) when the
    /// field/kind/value combination is unsupported.
    pub fn apply(
        &mut self,
        field: &str,
        value: &Value,
        host: &mut dyn SceneHost,
        batch: &mut WriteBatch,
    ) -> bool {
        let Some(prop) = Property::from_field(field) else {
            error!("item '{}': unsupported field '{field}'", self.name);
            return false;
        };
        let target = self.target_ref().to_string();
        let op = |f: &str, v: Value| WriteOp::property(&target, f, v);
        let kind = self.kind.clone();

        match (&kind, prop) {
            (TargetKind::Texture, Property::Translation)
            | (TargetKind::Texture, Property::Rotation)
            | (TargetKind::Texture, Property::Scale)
            | (TargetKind::Texture, Property::Center) => {
                let tex = self.texture_mut(host);
                match prop {
                    Property::Translation => tex.translation = vec2_of(value),
                    Property::Rotation => tex.rotation = to_float(value),
                    Property::Scale => tex.scale = vec2_of(value),
                    _ => tex.center = vec2_of(value),
                }
                let m = tex.matrix().to_vec();
                emit(host, batch, op(props::TEXTURE_MATRIX, Value::Vector(m)));
            }
            (TargetKind::SceneNode, Property::Translation) => {
                emit(host, batch, op(props::TRANSLATION, Value::Vec3(to_vec3(value))));
            }
            (TargetKind::SceneNode, Property::Scale) => {
                emit(host, batch, op(props::SCALE, Value::Vec3(to_vec3(value))));
            }
            (TargetKind::SceneNode, Property::Rotation) => {
                let Some(rot) = rotation_of(value) else {
                    error!(
                        "item '{}': cannot read a rotation from {:?}",
                        self.name,
                        value.kind()
                    );
                    return false;
                };
                self.aux.rotation = Some(rot);
                emit(host, batch, op(props::ROTATION, Value::Quat(rot.to_quat())));
            }
            (TargetKind::Material, Property::DiffuseColor) => {
                emit(host, batch, op(props::DIFFUSE_COLOR, Value::Color(to_vec3(value))));
            }
            (TargetKind::Material, Property::SpecularColor) => {
                emit(host, batch, op(props::SPECULAR_COLOR, Value::Color(to_vec3(value))));
            }
            (TargetKind::Material, Property::EmissiveColor) => {
                emit(host, batch, op(props::EMISSIVE_COLOR, Value::Color(to_vec3(value))));
            }
            (TargetKind::Material, Property::Transparency) => {
                emit(host, batch, op(props::TRANSPARENCY, Value::Float(to_float(value))));
            }
            (TargetKind::Light, Property::On) => {
                emit(host, batch, op(props::ON, Value::Bool(to_bool(value))));
            }
            (TargetKind::Light, Property::Intensity) => {
                emit(host, batch, op(props::INTENSITY, Value::Float(to_float(value))));
            }
            (TargetKind::Light, Property::Color) => {
                emit(host, batch, op(props::COLOR, Value::Color(to_vec3(value))));
            }
            (TargetKind::Light, Property::Direction) => {
                let dir = normalize3(to_vec3(value)).unwrap_or([0.0, 0.0, -1.0]);
                self.aux.light_direction = Some(dir);
                emit(host, batch, op(props::DIRECTION, Value::Vec3(dir)));
            }
            (TargetKind::Switch, Property::WhichChoice) => {
                emit(
                    host,
                    batch,
                    op(props::WHICH_CHOICE, Value::Int(to_float(value) as i32)),
                );
            }
            (TargetKind::Switch, Property::On) => {
                let choice = if to_bool(value) { 0 } else { -1 };
                emit(host, batch, op(props::WHICH_CHOICE, Value::Int(choice)));
            }
            (TargetKind::TextObject, Property::Text) => {
                let text = match value {
                    Value::Text(s) => s.clone(),
                    other => to_float(other).to_string(),
                };
                emit(host, batch, op(props::TEXT, Value::Text(text)));
            }
            (TargetKind::VideoPlayer, Property::MediaStart)
            | (TargetKind::VideoPlayer, Property::MediaPause)
            | (TargetKind::VideoPlayer, Property::MediaStop) => {
                if !to_bool(value) {
                    debug!("item '{}': media request with a false value ignored", self.name);
                    return true;
                }
                let cmd = match prop {
                    Property::MediaStart => "start",
                    Property::MediaPause => "pause",
                    _ => "stop",
                };
                emit(host, batch, op(props::MEDIA, Value::Text(cmd.to_string())));
            }
            (kind, prop) => {
                error!(
                    "item '{}': {prop:?} is not writable on {kind:?}",
                    self.name
                );
                return false;
            }
        }
        true
    }

    /// Read the property named by `field`, preferring the cached authored
    /// form over the host's native one.
    pub fn read(&self, field: &str, host: &dyn SceneHost) -> Option<Value> {
        let prop = Property::from_field(field)?;
        match (&self.kind, prop) {
            (TargetKind::Texture, p) => {
                let tex = self
                    .aux
                    .texture
                    .clone()
                    .unwrap_or_else(|| TextureTransform::new(MAT3_IDENTITY));
                match p {
                    Property::Translation => Some(Value::Vec2(tex.translation)),
                    Property::Rotation => Some(Value::Float(tex.rotation)),
                    Property::Scale => Some(Value::Vec2(tex.scale)),
                    Property::Center => Some(Value::Vec2(tex.center)),
                    _ => None,
                }
            }
            (TargetKind::Viewpoint { position, .. }, Property::Translation) => {
                Some(Value::Vec3(*position))
            }
            (TargetKind::Viewpoint { orientation, .. }, Property::Rotation) => {
                Some(Value::AxisAngle(*orientation))
            }
            (_, Property::Rotation) => match self.aux.rotation {
                Some(r) => Some(Value::AxisAngle(r)),
                None => host
                    .read(&self.path(props::ROTATION))
                    .and_then(|v| rotation_of(&v))
                    .map(Value::AxisAngle),
            },
            (_, Property::Direction) => match self.aux.light_direction {
                Some(d) => Some(Value::Vec3(d)),
                None => host.read(&self.path(props::DIRECTION)),
            },
            (_, p) => host.read(&self.path(host_field(p)?)),
        }
    }
}

fn host_field(p: Property) -> Option<&'static str> {
    Some(match p {
        Property::Translation => props::TRANSLATION,
        Property::Rotation => props::ROTATION,
        Property::Scale => props::SCALE,
        Property::DiffuseColor => props::DIFFUSE_COLOR,
        Property::SpecularColor => props::SPECULAR_COLOR,
        Property::EmissiveColor => props::EMISSIVE_COLOR,
        Property::Transparency => props::TRANSPARENCY,
        Property::Intensity => props::INTENSITY,
        Property::Color => props::COLOR,
        Property::Direction => props::DIRECTION,
        Property::WhichChoice => props::WHICH_CHOICE,
        Property::Text => props::TEXT,
        Property::On => props::ON,
        Property::Center
        | Property::MediaStart
        | Property::MediaPause
        | Property::MediaStop => return None,
    })
}
