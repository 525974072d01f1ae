//! Write operations produced by the runtime to describe property writes into
//! the scene host using typed paths.
//!
//! WriteOp serializes to JSON as:
//!   { "path": "Door.translation", "value": { "type": "Vec3", "data": [1,2,3] } }
//!
//! WriteBatch is a simple Vec<WriteOp> with helpers; each frame report carries
//! the batch of writes the core performed.

use crate::{typed_path::TypedPath, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub path: TypedPath,
    pub value: Value,
}

impl WriteOp {
    pub fn new(path: TypedPath, value: Value) -> Self {
        Self { path, value }
    }

    /// Shorthand for `WriteOp::new(TypedPath::new(node, field), value)`.
    pub fn property(node: &str, field: &str, value: Value) -> Self {
        Self::new(TypedPath::new(node, field), value)
    }
}

/// A batch of write operations, in the order they were applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch(pub Vec<WriteOp>);

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch(Vec::new())
    }

    pub fn push(&mut self, op: WriteOp) {
        self.0.push(op);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = WriteOp>) {
        self.0.extend(other);
    }

    pub fn into_vec(self) -> Vec<WriteOp> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Merge another batch in-place (append).
    pub fn append(&mut self, mut other: WriteBatch) {
        self.0.append(&mut other.0)
    }

    /// Last value written to `path` in this batch.
    pub fn last_for(&self, path: &TypedPath) -> Option<&Value> {
        self.0
            .iter()
            .rev()
            .find(|op| &op.path == path)
            .map(|op| &op.value)
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = serde_json::to_string(&self.value).map_err(|_| fmt::Error)?;
        write!(f, "{{ path: {}, value: {} }}", self.path, val)
    }
}
