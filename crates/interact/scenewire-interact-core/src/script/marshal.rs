//! Typed value exchange across the script boundary.
//!
//! Arguments go out as a flat positional list: each input field in declared
//! order, decomposed into primitives (`vec3` as 3 floats, rotation as
//! `angle, x, y, z`), with the timestamp, when the entry function takes one,
//! right after the first field. Results come back by name and are written
//! to their bound destinations.

use log::error;
use serde::{Deserialize, Serialize};

use scenewire_api_core::coercion::{to_bool, to_float, to_vector};
use scenewire_api_core::{
    AxisAngle, FieldType, SceneHost, ScriptHandle, ScriptRuntime, ScriptValue, UnpackEntry,
    UnpackPlan, Value, WriteBatch,
};

use crate::decl::{sanitize_interval, BindingEnd, Declarations, FieldBinding, ScriptObject};
use crate::defined_item::rotation_of;
use crate::fields::field_matches;
use crate::registry::{ScriptId, ToggleId};

/// Event context supplied by the state machine that invokes a script.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub over: bool,
    pub active: bool,
    pub hit_point: Option<[f32; 3]>,
    /// Up to four positional values (drag translation or rotation).
    pub payload: Vec<f32>,
}

/// Neutral value of a type, used for unbound inputs without an initial value.
pub fn default_for(ty: FieldType) -> Value {
    match ty {
        FieldType::SFBool => Value::Bool(false),
        FieldType::SFInt32 => Value::Int(0),
        FieldType::SFFloat => Value::Float(0.0),
        FieldType::SFDouble | FieldType::SFTime => Value::Double(0.0),
        FieldType::SFString => Value::Text(String::new()),
        FieldType::SFVec2f => Value::Vec2([0.0; 2]),
        FieldType::SFVec3f => Value::Vec3([0.0; 3]),
        FieldType::SFColor => Value::Color([0.0; 3]),
        FieldType::SFRotation => Value::AxisAngle(AxisAngle::IDENTITY),
        FieldType::MFFloat => Value::Vector(Vec::new()),
    }
}

fn components(ty: FieldType, v: &Value) -> Vec<f32> {
    let mut out = match ty {
        FieldType::SFRotation => rotation_of(v)
            .map(|r| r.to_axyz().to_vec())
            .unwrap_or_else(|| to_vector(v)),
        _ => to_vector(v),
    };
    out.resize(ty.slots(), 0.0);
    out
}

/// Flatten a value into the primitives a field of `ty` occupies.
pub fn decompose(ty: FieldType, v: &Value) -> Vec<ScriptValue> {
    match ty {
        FieldType::SFBool => vec![ScriptValue::Bool(to_bool(v))],
        FieldType::SFInt32 => {
            let i = match v {
                Value::Int(i) => *i as i64,
                other => to_float(other).round() as i64,
            };
            vec![ScriptValue::Int(i)]
        }
        FieldType::SFFloat => vec![ScriptValue::Float(to_float(v) as f64)],
        FieldType::SFDouble | FieldType::SFTime => {
            let d = match v {
                Value::Double(d) => *d,
                other => to_float(other) as f64,
            };
            vec![ScriptValue::Float(d)]
        }
        FieldType::SFString => {
            let s = match v {
                Value::Text(s) => s.clone(),
                other => to_float(other).to_string(),
            };
            vec![ScriptValue::Str(s)]
        }
        FieldType::SFVec2f | FieldType::SFVec3f | FieldType::SFColor | FieldType::SFRotation => {
            components(ty, v)
                .into_iter()
                .map(|c| ScriptValue::Float(c as f64))
                .collect()
        }
        FieldType::MFFloat => vec![ScriptValue::List(
            to_vector(v).into_iter().map(f64::from).collect(),
        )],
    }
}

/// A value as a single named binding: scalars stay scalar, composites
/// become a list in component order.
pub fn binding_value(ty: FieldType, v: &Value) -> ScriptValue {
    let mut parts = decompose(ty, v);
    if parts.len() == 1 {
        return parts.remove(0);
    }
    ScriptValue::List(parts.iter().filter_map(ScriptValue::as_f64).collect())
}

/// Rebuild a typed value from a binding read back from the runtime.
pub fn compose(ty: FieldType, sv: &ScriptValue) -> Option<Value> {
    let comps = |n: usize| -> Option<Vec<f32>> {
        let c = sv.components();
        (c.len() >= n).then(|| c.into_iter().take(n).map(|x| x as f32).collect())
    };
    Some(match ty {
        FieldType::SFBool => Value::Bool(match sv {
            ScriptValue::Bool(b) => *b,
            ScriptValue::Str(s) => s.trim().eq_ignore_ascii_case("true"),
            other => other.as_f64().is_some_and(|f| f != 0.0),
        }),
        FieldType::SFInt32 => Value::Int(sv.as_f64()?.round() as i32),
        FieldType::SFFloat => Value::Float(sv.as_f64()? as f32),
        FieldType::SFDouble | FieldType::SFTime => Value::Double(sv.as_f64()?),
        FieldType::SFString => Value::Text(match sv {
            ScriptValue::Str(s) => s.clone(),
            other => other.as_f64()?.to_string(),
        }),
        FieldType::SFVec2f => {
            let c = comps(2)?;
            Value::Vec2([c[0], c[1]])
        }
        FieldType::SFVec3f => {
            let c = comps(3)?;
            Value::Vec3([c[0], c[1], c[2]])
        }
        FieldType::SFColor => {
            let c = comps(3)?;
            Value::Color([c[0], c[1], c[2]])
        }
        FieldType::SFRotation => {
            let c = comps(4)?;
            Value::AxisAngle(AxisAngle::new([c[1], c[2], c[3]], c[0]))
        }
        FieldType::MFFloat => {
            Value::Vector(sv.components().into_iter().map(|x| x as f32).collect())
        }
    })
}

/// Positional layout of a script's inputs. Fields of unsupported type are
/// logged and left out.
///
/// The timestamp is the second positional value, not the second slot: it
/// follows every component of the first input, so an SFVec3f first field
/// puts it at slot 3. This keeps composite values contiguous in the raw
/// argument list.
pub fn layout(script: &ScriptObject, takes_timestamp: bool) -> UnpackPlan {
    let mut plan = UnpackPlan::default();
    let mut cursor = 0usize;
    for field in script.fields.iter().filter(|f| f.access.is_input()) {
        let Some(ty) = field.ty() else {
            error!(
                "script '{}': field '{}' has unsupported type '{}'",
                script.name, field.name, field.declared_type
            );
            continue;
        };
        plan.entries.push(UnpackEntry {
            field: field.name.clone(),
            ty,
            offset: cursor,
        });
        cursor += ty.slots();
        if takes_timestamp && plan.timestamp_slot.is_none() {
            plan.timestamp_slot = Some(cursor);
            cursor += 1;
        }
    }
    if takes_timestamp && plan.timestamp_slot.is_none() {
        plan.timestamp_slot = Some(0);
    }
    plan
}

fn event_value(source_field: &str, event: &ScriptEvent, elapsed: f64) -> Option<Value> {
    if field_matches(source_field, "isover") {
        Some(Value::Bool(event.over))
    } else if field_matches(source_field, "isactive") {
        Some(Value::Bool(event.active))
    } else if field_matches(source_field, "hitpoint") {
        Some(Value::Vec3(event.hit_point.unwrap_or([0.0; 3])))
    } else if field_matches(source_field, "touchtime") {
        Some(Value::Double(elapsed))
    } else if !event.payload.is_empty() {
        Some(Value::Vector(event.payload.clone()))
    } else {
        None
    }
}

fn source_value(
    binding: &FieldBinding,
    decls: &Declarations,
    host: &dyn SceneHost,
    event: Option<&ScriptEvent>,
    elapsed: f64,
) -> Option<Value> {
    match binding.end {
        BindingEnd::Trigger(_) => event.and_then(|e| event_value(&binding.field, e, elapsed)),
        BindingEnd::Item(i) => decls.items.get(i)?.read(&binding.field, host),
        BindingEnd::Toggle(g) => decls.toggles.get(g).map(|t| Value::Bool(t.state)),
        BindingEnd::Timer(t) => {
            let timer = decls.timers.get(t)?;
            let cycle = timer.cycle_interval as f64;
            if field_matches(&binding.field, "fraction") {
                Some(Value::Float(((elapsed % cycle) / cycle) as f32))
            } else if field_matches(&binding.field, "time") {
                Some(Value::Double(elapsed))
            } else {
                Some(Value::Float(timer.cycle_interval))
            }
        }
    }
}

/// Build the positional argument list for one invocation of `script`.
///
/// Inputs without a usable source keep the script's current binding
/// (`current`), then the declared initial value, then a neutral default.
pub fn build_args(
    script: &ScriptObject,
    plan: &UnpackPlan,
    decls: &Declarations,
    host: &dyn SceneHost,
    event: Option<&ScriptEvent>,
    elapsed: f64,
    current: &dyn Fn(&str) -> Option<ScriptValue>,
) -> Vec<ScriptValue> {
    let mut args = Vec::with_capacity(plan.width());
    for entry in &plan.entries {
        let value = script
            .input_binding(&entry.field)
            .and_then(|b| source_value(b, decls, host, event, elapsed))
            .or_else(|| current(&entry.field).and_then(|sv| compose(entry.ty, &sv)))
            .or_else(|| script.field(&entry.field).and_then(|f| f.value.clone()))
            .unwrap_or_else(|| default_for(entry.ty));
        args.extend(decompose(entry.ty, &value));
    }
    if let Some(slot) = plan.timestamp_slot {
        args.insert(slot.min(args.len()), ScriptValue::Float(elapsed));
    }
    args
}

/// Read every output binding back and write it to its destination. Returns
/// toggles whose state changed.
pub fn apply_results(
    id: ScriptId,
    handle: ScriptHandle,
    runtime: &dyn ScriptRuntime,
    decls: &mut Declarations,
    host: &mut dyn SceneHost,
    batch: &mut WriteBatch,
) -> Vec<ToggleId> {
    let Some(script) = decls.scripts.get(id) else {
        return Vec::new();
    };
    let name = script.name.clone();
    let outputs: Vec<(String, Option<FieldType>, FieldBinding)> = script
        .outputs
        .iter()
        .map(|(f, b)| (f.clone(), script.field(f).and_then(|d| d.ty()), b.clone()))
        .collect();

    let mut flipped = Vec::new();
    for (field, ty, binding) in outputs {
        let Some(ty) = ty else {
            error!("script '{name}': output '{field}' has an unsupported type");
            continue;
        };
        let Some(raw) = runtime.read_binding(handle, &field) else {
            continue;
        };
        let Some(value) = compose(ty, &raw) else {
            error!("script '{name}': output '{field}' is not a valid {}", ty.name());
            continue;
        };
        match binding.end {
            BindingEnd::Item(i) => {
                if let Some(item) = decls.items.get_mut(i) {
                    item.apply(&binding.field, &value, host, batch);
                }
            }
            BindingEnd::Toggle(g) => {
                if let Some(t) = decls.toggles.get_mut(g) {
                    let next = to_bool(&value);
                    if t.state != next {
                        t.state = next;
                        flipped.push(g);
                    }
                }
            }
            BindingEnd::Timer(t) => {
                if let Some(timer) = decls.timers.get_mut(t) {
                    timer.cycle_interval = sanitize_interval(to_float(&value));
                }
            }
            BindingEnd::Trigger(_) => {
                error!("script '{name}': output '{field}' cannot drive a trigger");
            }
        }
    }
    flipped
}
