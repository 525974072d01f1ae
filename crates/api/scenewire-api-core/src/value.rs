//! Value: typed scene property values exchanged between the core, the host and
//! animation channels. Numeric vectors use f32; time values use f64.

use serde::{Deserialize, Serialize};

/// Lightweight kind enum for quick dispatch without matching payloads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Float,
    Double,
    Int,
    Bool,
    Vec2,
    Vec3,
    Quat,
    Color,
    AxisAngle,
    Vector,
    Text,
}

/// Axis-angle rotation as authored in scene markup and exchanged with scripts.
///
/// The host stores rotations as quaternions; this form is kept alongside so
/// that an angle of, say, 4π or a deliberately non-normalized axis survives a
/// write/read cycle.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AxisAngle {
    pub axis: [f32; 3],
    pub angle: f32,
}

impl AxisAngle {
    pub const IDENTITY: AxisAngle = AxisAngle {
        axis: [0.0, 0.0, 1.0],
        angle: 0.0,
    };

    pub fn new(axis: [f32; 3], angle: f32) -> Self {
        Self { axis, angle }
    }

    /// Build from markup order `(x, y, z, angle)`.
    pub fn from_xyza(v: [f32; 4]) -> Self {
        Self {
            axis: [v[0], v[1], v[2]],
            angle: v[3],
        }
    }

    /// Components in script-argument order `(angle, x, y, z)`.
    pub fn to_axyz(self) -> [f32; 4] {
        [self.angle, self.axis[0], self.axis[1], self.axis[2]]
    }

    pub fn to_quat(self) -> [f32; 4] {
        crate::math::quat_from_axis_angle(self.axis, self.angle)
    }
}

impl Default for AxisAngle {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// Double precision scalar (time stamps, SFDouble)
    Double(f64),

    /// Integer (switch choices, SFInt32)
    Int(i32),

    /// Boolean (step)
    Bool(bool),

    /// 2D vector (texture coordinates)
    Vec2([f32; 2]),

    /// 3D vector
    Vec3([f32; 3]),

    /// Quaternion (x, y, z, w), the host's native rotation form
    Quat([f32; 4]),

    /// RGB color
    Color([f32; 3]),

    /// Axis-angle rotation
    AxisAngle(AxisAngle),

    /// Generic, variable-length numeric vector
    Vector(Vec<f32>),

    /// Text / string; step-only for interpolation
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Int(_) => ValueKind::Int,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Quat(_) => ValueKind::Quat,
            Value::Color(_) => ValueKind::Color,
            Value::AxisAngle(_) => ValueKind::AxisAngle,
            Value::Vector(_) => ValueKind::Vector,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Convenience constructors
    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn quat(x: f32, y: f32, z: f32, w: f32) -> Self {
        Value::Quat([x, y, z, w])
    }

    pub fn rotation(axis: [f32; 3], angle: f32) -> Self {
        Value::AxisAngle(AxisAngle::new(axis, angle))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_quat(&self) -> Option<[f32; 4]> {
        match self {
            Value::Quat(q) => Some(*q),
            _ => None,
        }
    }
}
