//! scenewire-api-core: shared value, path and boundary types (engine-agnostic).
//!
//! The interactivity core talks to two black boxes, a scene-graph host and a
//! script runtime. Both boundaries live here so host adapters and script
//! back-ends only need this crate.

pub mod coercion;
pub mod host;
pub mod math;
pub mod script;
pub mod typed_path;
pub mod value;
pub mod write_ops;

pub use host::{props, SceneHost};
pub use script::{
    FieldType, ScriptError, ScriptHandle, ScriptRuntime, ScriptValue, UnpackEntry, UnpackPlan,
};
pub use typed_path::TypedPath;
pub use value::{AxisAngle, Value, ValueKind};
pub use write_ops::{WriteBatch, WriteOp};
