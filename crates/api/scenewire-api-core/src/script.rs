//! Script runtime boundary.
//!
//! The core hands a runtime flat positional argument lists of primitive
//! `ScriptValue`s and reads named bindings back. A runtime is asked once per
//! script to install an `UnpackPlan`, the preamble that turns the positional
//! list into named, typed variables before the entry function runs.
//!
//! Composite values travel decomposed in a fixed component order:
//! vec2 `(x, y)`, vec3 `(x, y, z)`, color `(r, g, b)`, rotation
//! `(angle, x, y, z)`. Runtimes flatten composite bindings back in the same
//! order when they are read.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle to a script loaded in a runtime.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ScriptHandle(pub u32);

/// Primitive values that cross the script boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    Bool(bool),
    Float(f64),
    Int(i64),
    Str(String),
    List(Vec<f64>),
}

impl ScriptValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Float(f) => Some(*f),
            ScriptValue::Int(i) => Some(*i as f64),
            ScriptValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ScriptValue::Str(s) => s.trim().parse().ok(),
            ScriptValue::List(v) => v.first().copied(),
        }
    }

    /// Numeric components of the value; a scalar yields one component.
    pub fn components(&self) -> Vec<f64> {
        match self {
            ScriptValue::List(v) => v.clone(),
            other => other.as_f64().into_iter().collect(),
        }
    }
}

/// Declared type of a script field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    SFBool,
    SFInt32,
    SFFloat,
    SFDouble,
    SFTime,
    SFString,
    SFVec2f,
    SFVec3f,
    SFColor,
    SFRotation,
    MFFloat,
}

impl FieldType {
    /// Parse a declared type name; matching ignores ASCII case.
    pub fn parse(s: &str) -> Option<Self> {
        let t = s.trim();
        let all = [
            FieldType::SFBool,
            FieldType::SFInt32,
            FieldType::SFFloat,
            FieldType::SFDouble,
            FieldType::SFTime,
            FieldType::SFString,
            FieldType::SFVec2f,
            FieldType::SFVec3f,
            FieldType::SFColor,
            FieldType::SFRotation,
            FieldType::MFFloat,
        ];
        all.into_iter().find(|ft| ft.name().eq_ignore_ascii_case(t))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::SFBool => "SFBool",
            FieldType::SFInt32 => "SFInt32",
            FieldType::SFFloat => "SFFloat",
            FieldType::SFDouble => "SFDouble",
            FieldType::SFTime => "SFTime",
            FieldType::SFString => "SFString",
            FieldType::SFVec2f => "SFVec2f",
            FieldType::SFVec3f => "SFVec3f",
            FieldType::SFColor => "SFColor",
            FieldType::SFRotation => "SFRotation",
            FieldType::MFFloat => "MFFloat",
        }
    }

    /// Number of positional slots this type occupies in an argument list.
    pub fn slots(&self) -> usize {
        match self {
            FieldType::SFVec2f => 2,
            FieldType::SFVec3f | FieldType::SFColor => 3,
            FieldType::SFRotation => 4,
            _ => 1,
        }
    }
}

/// One named variable the preamble constructs from the raw argument list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnpackEntry {
    pub field: String,
    pub ty: FieldType,
    /// Index of the first slot in the raw argument list.
    pub offset: usize,
}

/// Preamble description: how to rebuild named typed inputs from positional
/// arguments. `timestamp_slot` is the raw index holding the elapsed time, if
/// the entry function takes one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnpackPlan {
    pub entries: Vec<UnpackEntry>,
    pub timestamp_slot: Option<usize>,
}

impl UnpackPlan {
    /// Total raw slots the plan consumes.
    pub fn width(&self) -> usize {
        let fields = self
            .entries
            .iter()
            .map(|e| e.offset + e.ty.slots())
            .max()
            .unwrap_or(0);
        let ts = self.timestamp_slot.map(|s| s + 1).unwrap_or(0);
        fields.max(ts)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    #[error("script '{script}' failed to compile: {message}")]
    Compile { script: String, message: String },
    #[error("script '{script}' failed in '{function}': {message}")]
    Runtime {
        script: String,
        function: String,
        message: String,
    },
    #[error("script '{script}' has no function '{function}'")]
    MissingFunction { script: String, function: String },
    #[error("unknown script handle {0:?}")]
    UnknownHandle(ScriptHandle),
}

/// Capability interface over an embedded script engine.
///
/// All calls happen on the host's update thread; implementations need not be
/// `Send` or `Sync`.
pub trait ScriptRuntime {
    /// Compile `source` and return a handle for later calls.
    fn load(&mut self, name: &str, source: &str) -> Result<ScriptHandle, ScriptError>;

    /// Parameter count of a function defined by the script, `None` if absent.
    fn arity(&self, handle: ScriptHandle, function: &str) -> Option<usize>;

    /// Install the argument-unpacking preamble for this script.
    fn install_preamble(&mut self, handle: ScriptHandle, plan: &UnpackPlan)
        -> Result<(), ScriptError>;

    /// Run `function`. With a non-empty `args` list and an installed plan the
    /// arguments are first unpacked into named bindings; the function then
    /// receives the binding that shares its name and, when it declares a
    /// second parameter, the timestamp.
    fn invoke(
        &mut self,
        handle: ScriptHandle,
        function: &str,
        args: &[ScriptValue],
    ) -> Result<(), ScriptError>;

    /// Read a named binding; `None` when unset.
    fn read_binding(&self, handle: ScriptHandle, name: &str) -> Option<ScriptValue>;

    /// Seed a named binding (initial field values).
    fn write_binding(
        &mut self,
        handle: ScriptHandle,
        name: &str,
        value: ScriptValue,
    ) -> Result<(), ScriptError>;
}
