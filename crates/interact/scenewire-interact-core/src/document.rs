//! JSON scene-declaration documents.
//!
//! A document is the ordered list of registration calls a markup parser
//! would make: entities first, then links. Applying one to an
//! [`Interactivity`] reproduces that call sequence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decl::{Interpolator, ScriptObject, Timer, Toggle, Trigger};
use crate::defined_item::DefinedItem;
use crate::link::{Link, LinkOutcome};
use crate::Interactivity;

#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("scene document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("declarations cannot be added after compile")]
    AlreadyCompiled,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDocument {
    pub triggers: Vec<Trigger>,
    pub timers: Vec<Timer>,
    pub interpolators: Vec<Interpolator>,
    pub toggles: Vec<Toggle>,
    pub scripts: Vec<ScriptObject>,
    pub items: Vec<DefinedItem>,
    pub links: Vec<Link>,
}

impl SceneDocument {
    pub fn from_json(s: &str) -> Result<Self, DeclarationError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Register every entity, then resolve every link in order. Returns the
    /// outcome of each link.
    pub fn apply(&self, target: &mut Interactivity) -> Result<Vec<LinkOutcome>, DeclarationError> {
        if target.is_compiled() {
            return Err(DeclarationError::AlreadyCompiled);
        }
        for t in &self.triggers {
            target.declare_trigger(t.clone());
        }
        for t in &self.timers {
            target.declare_timer(t.clone());
        }
        for i in &self.interpolators {
            target.declare_interpolator(i.clone());
        }
        for g in &self.toggles {
            target.declare_toggle(g.clone());
        }
        for s in &self.scripts {
            target.declare_script(s.clone());
        }
        for i in &self.items {
            target.declare_item(i.clone());
        }
        Ok(self
            .links
            .iter()
            .map(|l| target.link(&l.from_node, &l.from_field, &l.to_node, &l.to_field))
            .collect())
    }
}
