//! Append-only, insertion-ordered registries of declared entities.
//!
//! Names are folded (trimmed, lowercased) for lookup; the declared spelling
//! stays on the entity. Ids are dense and equal to insertion index, so an id
//! handed out once stays valid for the life of the registry.

use std::marker::PhantomData;

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

/// Dense registry id.
pub trait RegistryId: Copy + Eq + std::hash::Hash + std::fmt::Debug {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! registry_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(pub u32);

            impl RegistryId for $name {
                #[inline]
                fn from_index(index: usize) -> Self {
                    $name(index as u32)
                }
                #[inline]
                fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

registry_id!(TriggerId, TimerId, InterpolatorId, ToggleId, ScriptId, ItemId);

/// Case-insensitive lookup key for a declared name.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct Registry<I, T> {
    entries: IndexMap<String, T>,
    _id: PhantomData<I>,
}

impl<I, T> Default for Registry<I, T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            _id: PhantomData,
        }
    }
}

impl<I: RegistryId, T> Registry<I, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `name`. A duplicate keeps the first entry and returns its id.
    pub fn insert(&mut self, name: &str, value: T) -> I {
        match self.entries.entry(fold_name(name)) {
            Entry::Occupied(slot) => {
                warn!("duplicate declaration '{name}' ignored; keeping the first one");
                I::from_index(slot.index())
            }
            Entry::Vacant(slot) => {
                let id = I::from_index(slot.index());
                slot.insert(value);
                id
            }
        }
    }

    pub fn find(&self, name: &str) -> Option<I> {
        self.entries.get_index_of(&fold_name(name)).map(I::from_index)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.entries.get_index(id.index()).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entries.get_index_mut(id.index()).map(|(_, v)| v)
    }

    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.entries.get(&fold_name(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries
            .values()
            .enumerate()
            .map(|(i, v)| (I::from_index(i), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_ids_are_dense() {
        let mut reg: Registry<ToggleId, &str> = Registry::new();
        assert_eq!(reg.insert("Lamp", "a"), ToggleId(0));
        assert_eq!(reg.insert("Door", "b"), ToggleId(1));
        assert_eq!(reg.find("  lAMP "), Some(ToggleId(0)));
        assert_eq!(reg.get(ToggleId(1)), Some(&"b"));
        assert_eq!(reg.find("missing"), None);
    }

    #[test]
    fn duplicates_keep_the_first_entry() {
        let mut reg: Registry<ItemId, u8> = Registry::new();
        reg.insert("Box", 1);
        assert_eq!(reg.insert("BOX", 2), ItemId(0));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.by_name("box"), Some(&1));
    }
}
