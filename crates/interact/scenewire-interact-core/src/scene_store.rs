use anyhow::{anyhow, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use scenewire_api_core::{SceneHost, TypedPath, Value, WriteOp};

/// A camera placement requested by anchor navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: [f32; 3],
    /// Quaternion (x, y, z, w).
    pub orientation: [f32; 4],
}

/// In-memory scene host: a property store plus logs of every request the
/// core made. Used headless and in tests.
#[derive(Debug)]
pub struct MemoryScene {
    // Map from TypedPath -> current value
    inner: HashMap<TypedPath, Value>,
    camera_position: [f32; 3],
    look_direction: [f32; 3],
    pub writes: Vec<WriteOp>,
    pub loaded_scenes: Vec<String>,
    pub documents: Vec<String>,
    pub collider_owners: Vec<String>,
    pub camera_placements: Vec<CameraPlacement>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self {
            inner: HashMap::new(),
            camera_position: [0.0; 3],
            look_direction: [0.0, 0.0, -1.0],
            writes: Vec::new(),
            loaded_scenes: Vec::new(),
            documents: Vec::new(),
            collider_owners: Vec::new(),
            camera_placements: Vec::new(),
        }
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a property by path string (`Node.field`).
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let tp = TypedPath::parse(path).map_err(|e| anyhow!("typedpath parse error: {}", e))?;
        self.inner.insert(tp, value);
        Ok(())
    }

    /// Get a property by path string. Returns None if absent or parse fails.
    pub fn get(&self, path: &str) -> Option<&Value> {
        TypedPath::parse(path).ok().and_then(|tp| self.inner.get(&tp))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn set_look_direction(&mut self, dir: [f32; 3]) {
        self.look_direction = dir;
    }

    pub fn set_camera_position(&mut self, pos: [f32; 3]) {
        self.camera_position = pos;
    }
}

impl SceneHost for MemoryScene {
    fn read(&self, path: &TypedPath) -> Option<Value> {
        self.inner.get(path).cloned()
    }

    fn write(&mut self, op: WriteOp) {
        self.inner.insert(op.path.clone(), op.value.clone());
        self.writes.push(op);
    }

    fn attach_colliders(&mut self, owner: &str) {
        self.collider_owners.push(owner.to_string());
    }

    fn load_scene(&mut self, url: &str) {
        self.loaded_scenes.push(url.to_string());
    }

    fn open_document(&mut self, url: &str) {
        self.documents.push(url.to_string());
    }

    fn camera_look_direction(&self) -> [f32; 3] {
        self.look_direction
    }

    fn camera_position(&self) -> [f32; 3] {
        self.camera_position
    }

    fn place_camera(&mut self, position: [f32; 3], orientation: [f32; 4]) {
        self.camera_position = position;
        self.camera_placements.push(CameraPlacement {
            position,
            orientation,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_write_log() {
        let mut s = MemoryScene::new();
        s.set("Door.translation", Value::vec3(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(s.get("Door.translation"), Some(&Value::vec3(1.0, 2.0, 3.0)));
        assert!(s.set("bad path", Value::Bool(true)).is_err());

        s.write(WriteOp::property("Lamp", "on", Value::Bool(true)));
        assert_eq!(s.get("Lamp.on"), Some(&Value::Bool(true)));
        assert_eq!(s.writes.len(), 1);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn camera_placement_moves_the_camera() {
        let mut s = MemoryScene::new();
        s.place_camera([0.0, 1.6, 10.0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(s.camera_position(), [0.0, 1.6, 10.0]);
        assert_eq!(s.camera_placements.len(), 1);
    }
}
