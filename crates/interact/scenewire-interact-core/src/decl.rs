//! Declared entities and the six-registry declaration set.

use log::{error, warn};
use serde::{Deserialize, Serialize};

use scenewire_api_core::{FieldType, ScriptHandle, UnpackPlan, Value};

use crate::defined_item::DefinedItem;
use crate::registry::{
    InterpolatorId, ItemId, Registry, ScriptId, TimerId, ToggleId, TriggerId,
};

fn yes() -> bool {
    true
}

fn default_axis() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

/// Sensor kind with its kind-specific constraints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TriggerKind {
    Touch,
    #[serde(rename_all = "camelCase")]
    Plane {
        #[serde(default)]
        min_position: [f32; 2],
        #[serde(default = "neg_unbounded")]
        max_position: [f32; 2],
    },
    #[serde(rename_all = "camelCase")]
    Cylinder {
        #[serde(default)]
        min_angle: f32,
        #[serde(default = "neg_one")]
        max_angle: f32,
        #[serde(default = "default_axis")]
        axis: [f32; 3],
    },
    Sphere,
    Anchor {
        url: String,
        #[serde(default)]
        parameters: Vec<String>,
    },
}

// Defaults leave min > max, which means "unclamped".
fn neg_unbounded() -> [f32; 2] {
    [-1.0, -1.0]
}

fn neg_one() -> f32 {
    -1.0
}

impl TriggerKind {
    pub fn is_drag(&self) -> bool {
        matches!(
            self,
            TriggerKind::Plane { .. } | TriggerKind::Cylinder { .. } | TriggerKind::Sphere
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub name: String,
    /// Scene node whose descendants are hit-tested.
    pub owner: String,
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(flatten)]
    pub kind: TriggerKind,
}

impl Trigger {
    pub fn new(name: &str, owner: &str, kind: TriggerKind) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            enabled: true,
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub name: String,
    #[serde(default = "one")]
    pub cycle_interval: f32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub stop_time: f64,
}

fn one() -> f32 {
    1.0
}

/// Non-positive or non-finite intervals fall back to one second.
pub fn sanitize_interval(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        1.0
    }
}

impl Timer {
    pub fn new(name: &str, cycle_interval: f32, looping: bool) -> Self {
        Self {
            name: name.to_string(),
            cycle_interval,
            looping,
            enabled: true,
            start_time: 0.0,
            stop_time: 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterpolatorKind {
    /// Vec3 key values (position or scale channels).
    Position,
    /// Axis-angle key values `(x, y, z, angle)`.
    Orientation,
}

impl InterpolatorKind {
    pub fn stride(self) -> usize {
        match self {
            InterpolatorKind::Position => 3,
            InterpolatorKind::Orientation => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpolator {
    pub name: String,
    pub kind: InterpolatorKind,
    pub keys: Vec<f32>,
    pub key_values: Vec<f32>,
}

impl Interpolator {
    pub fn new(name: &str, kind: InterpolatorKind, keys: Vec<f32>, key_values: Vec<f32>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            keys,
            key_values,
        }
    }

    /// Clamp keys into [0,1] and force `len(key_values) == len(keys) * stride`.
    pub fn sanitize(&mut self) {
        for k in &mut self.keys {
            *k = if k.is_finite() { k.clamp(0.0, 1.0) } else { 0.0 };
        }
        let expected = self.keys.len() * self.kind.stride();
        if self.key_values.len() != expected {
            error!(
                "interpolator '{}' has {} key values for {} keys (expected {}); resizing",
                self.name,
                self.key_values.len(),
                self.keys.len(),
                expected
            );
            self.key_values.resize(expected, 0.0);
        }
    }

    /// Key values grouped by stride.
    pub fn frames(&self) -> impl Iterator<Item = &[f32]> {
        self.key_values.chunks_exact(self.kind.stride())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Toggle {
    pub name: String,
    #[serde(default)]
    pub state: bool,
}

impl Toggle {
    pub fn new(name: &str, state: bool) -> Self {
        Self {
            name: name.to_string(),
            state,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Access {
    InputOnly,
    OutputOnly,
    InputOutput,
    InitializeOnly,
}

impl Access {
    pub fn is_input(self) -> bool {
        matches!(self, Access::InputOnly | Access::InputOutput)
    }

    pub fn is_output(self) -> bool {
        matches!(self, Access::OutputOnly | Access::InputOutput)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptField {
    pub name: String,
    pub access: Access,
    /// Declared type name as written.
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub value: Option<Value>,
}

impl ScriptField {
    pub fn new(name: &str, access: Access, declared_type: &str) -> Self {
        Self {
            name: name.to_string(),
            access,
            declared_type: declared_type.to_string(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Parsed type; `None` for types the marshaling layer does not handle.
    pub fn ty(&self) -> Option<FieldType> {
        FieldType::parse(&self.declared_type)
    }
}

/// The non-script end of a script field binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingEnd {
    Trigger(TriggerId),
    Item(ItemId),
    Toggle(ToggleId),
    Timer(TimerId),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldBinding {
    pub end: BindingEnd,
    /// Field name on the non-script end.
    pub field: String,
}

/// Runtime bookkeeping for a script, owned by the core.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScriptState {
    pub handle: Option<ScriptHandle>,
    /// Load failed; every later invocation is skipped.
    pub failed: bool,
    pub initialized: bool,
    pub per_frame: bool,
    pub takes_timestamp: bool,
    pub plan: UnpackPlan,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptObject {
    pub name: String,
    pub fields: Vec<ScriptField>,
    pub source: String,
    #[serde(skip)]
    pub inputs: Vec<(String, FieldBinding)>,
    #[serde(skip)]
    pub outputs: Vec<(String, FieldBinding)>,
    #[serde(skip)]
    pub state: ScriptState,
}

impl ScriptObject {
    pub fn new(name: &str, fields: Vec<ScriptField>, source: &str) -> Self {
        Self {
            name: name.to_string(),
            fields,
            source: source.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            state: ScriptState::default(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&ScriptField> {
        let name = name.trim();
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// The entry function shares the first declared field's name.
    pub fn entry(&self) -> Option<&str> {
        self.fields.first().map(|f| f.name.as_str())
    }

    pub fn input_binding(&self, field: &str) -> Option<&FieldBinding> {
        self.inputs
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(field))
            .map(|(_, b)| b)
    }

    /// Record an input source; the first binding of a field wins.
    pub fn bind_input(&mut self, field: &str, binding: FieldBinding) -> bool {
        let Some(declared) = self.field(field) else {
            warn!("script '{}' has no field '{field}'", self.name);
            return false;
        };
        let declared = declared.name.clone();
        if self.input_binding(&declared).is_some() {
            warn!(
                "script '{}' field '{declared}' already has a source; keeping it",
                self.name
            );
            return false;
        }
        self.inputs.push((declared, binding));
        true
    }

    /// Record an output destination; a field may feed several destinations.
    pub fn bind_output(&mut self, field: &str, binding: FieldBinding) -> bool {
        let Some(declared) = self.field(field) else {
            warn!("script '{}' has no field '{field}'", self.name);
            return false;
        };
        let declared = declared.name.clone();
        if !self
            .outputs
            .iter()
            .any(|(f, b)| f == &declared && b == &binding)
        {
            self.outputs.push((declared, binding));
        }
        true
    }
}

/// Any declared entity, tagged by registry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Trigger(TriggerId),
    Timer(TimerId),
    Interpolator(InterpolatorId),
    Toggle(ToggleId),
    Script(ScriptId),
    Item(ItemId),
}

#[derive(Debug, Default)]
pub struct Declarations {
    pub triggers: Registry<TriggerId, Trigger>,
    pub timers: Registry<TimerId, Timer>,
    pub interpolators: Registry<InterpolatorId, Interpolator>,
    pub toggles: Registry<ToggleId, Toggle>,
    pub scripts: Registry<ScriptId, ScriptObject>,
    pub items: Registry<ItemId, DefinedItem>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a link source. Triggers are tried first, then the
    /// destination order.
    pub fn resolve(&self, name: &str) -> Option<EntityRef> {
        self.triggers
            .find(name)
            .map(EntityRef::Trigger)
            .or_else(|| self.resolve_destination(name))
    }

    /// Resolve a link destination in fixed priority order:
    /// Timer, Interpolator, Toggle, Script, Item.
    pub fn resolve_destination(&self, name: &str) -> Option<EntityRef> {
        if let Some(id) = self.timers.find(name) {
            return Some(EntityRef::Timer(id));
        }
        if let Some(id) = self.interpolators.find(name) {
            return Some(EntityRef::Interpolator(id));
        }
        if let Some(id) = self.toggles.find(name) {
            return Some(EntityRef::Toggle(id));
        }
        if let Some(id) = self.scripts.find(name) {
            return Some(EntityRef::Script(id));
        }
        self.items.find(name).map(EntityRef::Item)
    }

    /// Count of registries that know `name`; more than one is a
    /// configuration error resolved by priority.
    pub fn ambiguity(&self, name: &str) -> usize {
        [
            self.triggers.find(name).is_some(),
            self.timers.find(name).is_some(),
            self.interpolators.find(name).is_some(),
            self.toggles.find(name).is_some(),
            self.scripts.find(name).is_some(),
            self.items.find(name).is_some(),
        ]
        .into_iter()
        .filter(|b| *b)
        .count()
    }
}
