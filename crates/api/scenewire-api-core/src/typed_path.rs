//! TypedPath parsing and formatting.
//!
//! Grammar:
//!   node[.field]
//! - `node` is the declared name of a scene target (a DEF name in markup)
//! - `field` is a canonical host property (see `host::props`)
//!   Examples:
//!   "Door.translation" -> node="Door", field=Some("translation")
//!   "Lamp.on"          -> node="Lamp", field=Some("on")
//!   "Door"             -> node="Door", field=None
//!
//! Node names may themselves contain dots, so the field is split off at the
//! last '.'.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedPath {
    pub node: String,
    pub field: Option<String>,
}

impl TypedPath {
    pub fn new(node: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            field: Some(field.into()),
        }
    }

    pub fn node_only(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            field: None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("empty path".to_string());
        }
        if s.chars().any(char::is_whitespace) {
            return Err(format!("invalid typed path '{s}': contains whitespace"));
        }
        let (node, field) = match s.rsplit_once('.') {
            Some((node, field)) => {
                if field.is_empty() {
                    return Err(format!("invalid typed path '{s}': empty field"));
                }
                (node, Some(field.to_string()))
            }
            None => (s, None),
        };
        if node.is_empty() {
            return Err(format!("invalid typed path '{s}': empty node name"));
        }
        Ok(TypedPath {
            node: node.to_string(),
            field,
        })
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for TypedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}.{}", self.node, field),
            None => f.write_str(&self.node),
        }
    }
}

impl FromStr for TypedPath {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypedPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for TypedPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypedPath {
    fn deserialize<D>(deserializer: D) -> Result<TypedPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TypedPath::parse(&s).map_err(de::Error::custom)
    }
}
