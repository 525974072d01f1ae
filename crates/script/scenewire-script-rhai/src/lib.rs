//! `ScriptRuntime` backed by the Rhai engine.
//!
//! Every script gets an object map bound as `this`. Field bindings live in
//! that map, so a script reads its inputs and writes its outputs through
//! `this.<field>`. Composite fields are maps: vec2 `#{x, y}`, vec3
//! `#{x, y, z}`, color `#{r, g, b}` and rotation `#{x, y, z, angle}`.

use hashbrown::HashMap;
use log::{debug, error, warn};
use rhai::{Array, CallFnOptions, Dynamic, Engine, Map, Scope, AST};
use serde::{Deserialize, Serialize};

use scenewire_api_core::{
    FieldType, ScriptError, ScriptHandle, ScriptRuntime, ScriptValue, UnpackPlan,
};

/// Generated function that assigns typed `this.<field>` values from the raw
/// argument array.
pub const PREAMBLE: &str = "__scenewire_unpack";

/// Engine limits applied to every script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhaiConfig {
    /// Operation budget per call; 0 is unlimited.
    pub max_operations: u64,
    pub max_call_levels: usize,
}

impl Default for RhaiConfig {
    fn default() -> Self {
        Self {
            max_operations: 1_000_000,
            max_call_levels: 64,
        }
    }
}

struct LoadedScript {
    name: String,
    ast: AST,
    scope: Scope<'static>,
    /// Object map bound as `this` on every call.
    this: Dynamic,
    arities: HashMap<String, usize>,
    plan: Option<UnpackPlan>,
}

impl LoadedScript {
    fn get(&self, name: &str) -> Option<Dynamic> {
        self.this
            .read_lock::<Map>()
            .and_then(|m| m.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: Dynamic) {
        if let Some(mut m) = self.this.write_lock::<Map>() {
            m.insert(name.into(), value);
        }
    }

    fn field_type(&self, name: &str) -> Option<FieldType> {
        self.plan
            .as_ref()?
            .entries
            .iter()
            .find(|e| e.field == name)
            .map(|e| e.ty)
    }
}

pub struct RhaiRuntime {
    engine: Engine,
    scripts: Vec<LoadedScript>,
}

impl Default for RhaiRuntime {
    fn default() -> Self {
        Self::new(RhaiConfig::default())
    }
}

impl RhaiRuntime {
    pub fn new(cfg: RhaiConfig) -> Self {
        let mut engine = Engine::new();
        engine.set_fast_operators(true);
        engine.set_max_operations(cfg.max_operations);
        engine.set_max_call_levels(cfg.max_call_levels);
        Self {
            engine,
            scripts: Vec::new(),
        }
    }

    fn script(&self, handle: ScriptHandle) -> Result<&LoadedScript, ScriptError> {
        self.scripts
            .get(handle.0 as usize)
            .ok_or(ScriptError::UnknownHandle(handle))
    }

    fn script_mut(&mut self, handle: ScriptHandle) -> Result<&mut LoadedScript, ScriptError> {
        self.scripts
            .get_mut(handle.0 as usize)
            .ok_or(ScriptError::UnknownHandle(handle))
    }

    /// Number of scripts loaded so far.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl ScriptRuntime for RhaiRuntime {
    fn load(&mut self, name: &str, source: &str) -> Result<ScriptHandle, ScriptError> {
        let compile_error = |message: String| ScriptError::Compile {
            script: name.to_string(),
            message,
        };
        let ast = self
            .engine
            .compile(source)
            .map_err(|e| compile_error(e.to_string()))?;
        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| compile_error(format!("evaluating global statements: {e}")))?;

        let arities = ast
            .iter_functions()
            .map(|f| (f.name.to_string(), f.params.len()))
            .collect::<HashMap<_, _>>();
        debug!("rhai script '{name}' compiled with {} functions", arities.len());

        let handle = ScriptHandle(self.scripts.len() as u32);
        self.scripts.push(LoadedScript {
            name: name.to_string(),
            ast,
            scope,
            this: Dynamic::from_map(Map::new()),
            arities,
            plan: None,
        });
        Ok(handle)
    }

    fn arity(&self, handle: ScriptHandle, function: &str) -> Option<usize> {
        self.script(handle).ok()?.arities.get(function).copied()
    }

    fn install_preamble(
        &mut self,
        handle: ScriptHandle,
        plan: &UnpackPlan,
    ) -> Result<(), ScriptError> {
        let engine = &self.engine;
        let script = self
            .scripts
            .get_mut(handle.0 as usize)
            .ok_or(ScriptError::UnknownHandle(handle))?;
        let source = render_preamble(engine, &script.name, plan);
        let preamble = engine.compile(&source).map_err(|e| ScriptError::Compile {
            script: script.name.clone(),
            message: format!("generated preamble: {e}"),
        })?;
        script.ast = script.ast.merge(&preamble);
        script.plan = Some(plan.clone());
        debug!("rhai script '{}' preamble:\n{source}", script.name);
        Ok(())
    }

    fn invoke(
        &mut self,
        handle: ScriptHandle,
        function: &str,
        args: &[ScriptValue],
    ) -> Result<(), ScriptError> {
        let engine = &self.engine;
        let script = self
            .scripts
            .get_mut(handle.0 as usize)
            .ok_or(ScriptError::UnknownHandle(handle))?;
        let Some(&arity) = script.arities.get(function) else {
            return Err(ScriptError::MissingFunction {
                script: script.name.clone(),
                function: function.to_string(),
            });
        };

        let mut call_args: Vec<Dynamic> = Vec::with_capacity(arity);
        if let Some(plan) = script.plan.clone().filter(|_| !args.is_empty()) {
            let mut raw: Array = args.iter().map(dynamic).collect();
            if raw.len() < plan.width() {
                warn!(
                    "script '{}': {} arguments for {} slots",
                    script.name,
                    raw.len(),
                    plan.width()
                );
                raw.resize(plan.width(), Dynamic::UNIT);
            }
            let _unpacked = call(engine, script, PREAMBLE, vec![Dynamic::from_array(raw)])?;
            call_args.push(script.get(function).unwrap_or(Dynamic::UNIT));
            if let Some(ts) = plan.timestamp_slot.and_then(|s| args.get(s)) {
                call_args.push(dynamic(ts));
            }
        }
        call_args.resize(arity, Dynamic::UNIT);
        call(engine, script, function, call_args).map(|_| ())
    }

    fn read_binding(&self, handle: ScriptHandle, name: &str) -> Option<ScriptValue> {
        let value = self.script(handle).ok()?.get(name)?;
        script_value(&value)
    }

    fn write_binding(
        &mut self,
        handle: ScriptHandle,
        name: &str,
        value: ScriptValue,
    ) -> Result<(), ScriptError> {
        let script = self.script_mut(handle)?;
        let dynamic = match (script.field_type(name), &value) {
            (Some(ty), ScriptValue::List(parts)) if ty.slots() > 1 => {
                let slots: Vec<ScriptValue> =
                    parts.iter().map(|p| ScriptValue::Float(*p)).collect();
                typed(ty, &slots)
            }
            // Outside the plan the shape follows the component count.
            (None, ScriptValue::List(parts)) => match parts.len() {
                2 => composite(&["x", "y"], parts),
                3 => composite(&["x", "y", "z"], parts),
                4 => composite(&["angle", "x", "y", "z"], parts),
                _ => dynamic(&value),
            },
            _ => dynamic(&value),
        };
        script.set(name, dynamic);
        Ok(())
    }
}

fn call(
    engine: &Engine,
    script: &mut LoadedScript,
    function: &str,
    args: Vec<Dynamic>,
) -> Result<Dynamic, ScriptError> {
    let options = CallFnOptions::new()
        .eval_ast(false)
        .rewind_scope(true)
        .bind_this_ptr(&mut script.this);
    engine
        .call_fn_with_options::<Dynamic>(options, &mut script.scope, &script.ast, function, args)
        .map_err(|e| ScriptError::Runtime {
            script: script.name.clone(),
            function: function.to_string(),
            message: e.to_string(),
        })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True when `this.<name>` parses inside a function body.
fn is_property(engine: &Engine, name: &str) -> bool {
    is_identifier(name) && engine.compile(format!("fn f() {{ this.{name} }}")).is_ok()
}

/// Rhai source of the unpacking function for `plan`.
fn render_preamble(engine: &Engine, script: &str, plan: &UnpackPlan) -> String {
    let mut body = String::new();
    for entry in &plan.entries {
        if !is_property(engine, &entry.field) {
            error!("script '{script}': field '{}' cannot be a Rhai property", entry.field);
            continue;
        }
        let o = entry.offset;
        let keys: &[&str] = match entry.ty {
            FieldType::SFVec2f => &["x", "y"],
            FieldType::SFVec3f => &["x", "y", "z"],
            FieldType::SFColor => &["r", "g", "b"],
            FieldType::SFRotation => &["angle", "x", "y", "z"],
            _ => &[],
        };
        let expr = if keys.is_empty() {
            format!("args[{o}]")
        } else {
            let parts: Vec<String> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| format!("{k}: args[{}]", o + i))
                .collect();
            format!("#{{ {} }}", parts.join(", "))
        };
        body.push_str(&format!("    this.{} = {expr};\n", entry.field));
    }
    format!("fn {PREAMBLE}(args) {{\n{body}}}\n")
}

fn dynamic(v: &ScriptValue) -> Dynamic {
    match v {
        ScriptValue::Bool(b) => Dynamic::from_bool(*b),
        ScriptValue::Float(f) => Dynamic::from_float(*f),
        ScriptValue::Int(i) => Dynamic::from_int(*i),
        ScriptValue::Str(s) => Dynamic::from(s.clone()),
        ScriptValue::List(items) => Dynamic::from_array(
            items.iter().map(|f| Dynamic::from_float(*f)).collect::<Array>(),
        ),
    }
}

/// Map with `keys` taken in order from `parts`.
fn composite(keys: &[&str], parts: &[f64]) -> Dynamic {
    let mut map = Map::new();
    for (key, part) in keys.iter().zip(parts) {
        map.insert((*key).into(), Dynamic::from_float(*part));
    }
    Dynamic::from_map(map)
}

/// Build the Rhai value of a field from its raw slots.
fn typed(ty: FieldType, slots: &[ScriptValue]) -> Dynamic {
    let parts: Vec<f64> = slots.iter().map(|s| s.as_f64().unwrap_or(0.0)).collect();
    match ty {
        FieldType::SFVec2f => composite(&["x", "y"], &parts),
        FieldType::SFVec3f => composite(&["x", "y", "z"], &parts),
        FieldType::SFColor => composite(&["r", "g", "b"], &parts),
        FieldType::SFRotation => composite(&["angle", "x", "y", "z"], &parts),
        _ => slots.first().map(dynamic).unwrap_or(Dynamic::UNIT),
    }
}

fn number(d: &Dynamic) -> Option<f64> {
    d.as_float()
        .ok()
        .or_else(|| d.as_int().ok().map(|i| i as f64))
}

/// Flatten a Rhai value back to the boundary form. Maps flatten by the keys
/// they carry: `angle` means rotation, `r` color, `z` vec3, else vec2.
fn script_value(d: &Dynamic) -> Option<ScriptValue> {
    if d.is_unit() {
        return None;
    }
    if let Ok(b) = d.as_bool() {
        return Some(ScriptValue::Bool(b));
    }
    if let Ok(i) = d.as_int() {
        return Some(ScriptValue::Int(i));
    }
    if let Ok(f) = d.as_float() {
        return Some(ScriptValue::Float(f));
    }
    if d.is_string() {
        return d.clone().into_string().ok().map(ScriptValue::Str);
    }
    if d.is_array() {
        let items = d.clone().into_array().ok()?;
        return Some(ScriptValue::List(items.iter().filter_map(number).collect()));
    }
    let map = d.read_lock::<Map>()?;
    let keys: &[&str] = if map.contains_key("angle") {
        &["angle", "x", "y", "z"]
    } else if map.contains_key("r") {
        &["r", "g", "b"]
    } else if map.contains_key("z") {
        &["x", "y", "z"]
    } else {
        &["x", "y"]
    };
    let parts = keys
        .iter()
        .map(|k| map.get(*k).and_then(number))
        .collect::<Option<Vec<f64>>>()?;
    Some(ScriptValue::List(parts))
}
