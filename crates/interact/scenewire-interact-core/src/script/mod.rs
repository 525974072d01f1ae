//! Script lifecycle on top of a `ScriptRuntime`: load, one-time
//! initialization, invocation with marshaled arguments and result apply.

pub mod marshal;

use log::{debug, error, warn};

use scenewire_api_core::{
    SceneHost, ScriptError, ScriptHandle, ScriptRuntime, ScriptValue, UnpackPlan, WriteBatch,
};

use crate::decl::{Declarations, ScriptObject};
use crate::registry::{ScriptId, ToggleId};

pub use marshal::ScriptEvent;

/// Name of the optional one-shot setup function.
pub const INITIALIZE: &str = "initialize";

/// Runtime for hosts without scripting. Every load fails, so scripts are
/// logged once and skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRuntime;

impl ScriptRuntime for NullRuntime {
    fn load(&mut self, name: &str, _source: &str) -> Result<ScriptHandle, ScriptError> {
        Err(ScriptError::Compile {
            script: name.to_string(),
            message: "no script runtime configured".into(),
        })
    }

    fn arity(&self, _handle: ScriptHandle, _function: &str) -> Option<usize> {
        None
    }

    fn install_preamble(
        &mut self,
        handle: ScriptHandle,
        _plan: &UnpackPlan,
    ) -> Result<(), ScriptError> {
        Err(ScriptError::UnknownHandle(handle))
    }

    fn invoke(
        &mut self,
        handle: ScriptHandle,
        _function: &str,
        _args: &[ScriptValue],
    ) -> Result<(), ScriptError> {
        Err(ScriptError::UnknownHandle(handle))
    }

    fn read_binding(&self, _handle: ScriptHandle, _name: &str) -> Option<ScriptValue> {
        None
    }

    fn write_binding(
        &mut self,
        handle: ScriptHandle,
        _name: &str,
        _value: ScriptValue,
    ) -> Result<(), ScriptError> {
        Err(ScriptError::UnknownHandle(handle))
    }
}

/// Compile the script once and detect its timestamp parameter. Returns false
/// when the script is unusable.
pub fn load(script: &mut ScriptObject, runtime: &mut dyn ScriptRuntime) -> bool {
    if script.state.failed {
        return false;
    }
    if script.state.handle.is_some() {
        return true;
    }
    let handle = match runtime.load(&script.name, &script.source) {
        Ok(h) => h,
        Err(e) => {
            error!("{e}");
            script.state.failed = true;
            return false;
        }
    };
    script.state.handle = Some(handle);

    let Some(entry) = script.entry().map(str::to_string) else {
        warn!("script '{}' declares no fields; nothing to invoke", script.name);
        script.state.failed = true;
        return false;
    };
    let Some(arity) = runtime.arity(handle, &entry) else {
        error!(
            "script '{}' does not define its entry function '{entry}'",
            script.name
        );
        script.state.failed = true;
        return false;
    };
    script.state.takes_timestamp = arity >= 2;
    script.state.plan = marshal::layout(script, script.state.takes_timestamp);
    debug!(
        "script '{}' loaded: entry '{entry}' arity {arity}, {} input slots",
        script.name,
        script.state.plan.width()
    );
    true
}

/// Initialization pass: install the unpacking preamble, seed initial field
/// values, then run `initialize()` when the script defines it.
pub fn initialize(script: &mut ScriptObject, runtime: &mut dyn ScriptRuntime) -> bool {
    if script.state.initialized {
        return true;
    }
    let Some(handle) = script.state.handle.filter(|_| !script.state.failed) else {
        return false;
    };
    if let Err(e) = runtime.install_preamble(handle, &script.state.plan) {
        error!("{e}");
        script.state.failed = true;
        return false;
    }
    for field in &script.fields {
        let (Some(ty), Some(value)) = (field.ty(), field.value.as_ref()) else {
            continue;
        };
        if let Err(e) =
            runtime.write_binding(handle, &field.name, marshal::binding_value(ty, value))
        {
            error!("{e}");
        }
    }
    if runtime.arity(handle, INITIALIZE).is_some() {
        if let Err(e) = runtime.invoke(handle, INITIALIZE, &[]) {
            error!("{e}");
        }
    }
    script.state.initialized = true;
    true
}

/// Invoke a script's entry function and apply its outputs. Returns the
/// toggles whose state the script changed. Unusable scripts are skipped.
pub fn invoke(
    id: ScriptId,
    decls: &mut Declarations,
    runtime: &mut dyn ScriptRuntime,
    host: &mut dyn SceneHost,
    batch: &mut WriteBatch,
    event: Option<&ScriptEvent>,
    elapsed: f64,
) -> Result<Vec<ToggleId>, ScriptError> {
    let Some(script) = decls.scripts.get_mut(id) else {
        return Ok(Vec::new());
    };
    if !load(script, runtime) || !initialize(script, runtime) {
        debug!("skipping unusable script '{}'", script.name);
        return Ok(Vec::new());
    }
    let (Some(handle), Some(entry)) = (script.state.handle, script.entry().map(str::to_string))
    else {
        return Ok(Vec::new());
    };

    let Some(script) = decls.scripts.get(id) else {
        return Ok(Vec::new());
    };
    let current = |field: &str| runtime.read_binding(handle, field);
    let args = marshal::build_args(
        script,
        &script.state.plan,
        decls,
        &*host,
        event,
        elapsed,
        &current,
    );
    runtime.invoke(handle, &entry, &args)?;
    Ok(marshal::apply_results(id, handle, &*runtime, decls, host, batch))
}
