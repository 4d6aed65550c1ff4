//! Slot-based property store.

use std::collections::HashMap;
use std::fmt;

use fcs_core::PropertyId;
use tracing::warn;

use crate::error::{PropertyError, PropertyResult};
use crate::name::normalize;

/// Read accessor of a tied property.
pub type Getter = Box<dyn Fn() -> f64>;
/// Write accessor of a tied property.
pub type Setter = Box<dyn Fn(f64)>;

enum Binding {
    Value(f64),
    Tied {
        getter: Getter,
        setter: Option<Setter>,
    },
}

struct Slot {
    name: String,
    binding: Binding,
}

/// Mapping from hierarchical names to mutable numeric values.
///
/// Names are resolved to [`PropertyId`] handles once. Per-frame reads and
/// writes go through the handle and never touch the name index.
#[derive(Default)]
pub struct PropertyStore {
    index: HashMap<String, PropertyId>,
    slots: Vec<Slot>,
}

impl PropertyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the store.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if no node exists yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Return the node for `name`, creating it with value `0.0` if needed.
    pub fn create(&mut self, name: &str) -> PropertyId {
        let key = normalize(name);
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = PropertyId::from_index(self.slots.len() as u32);
        self.slots.push(Slot {
            name: key.clone(),
            binding: Binding::Value(0.0),
        });
        self.index.insert(key, id);
        id
    }

    /// Look up an existing node.
    pub fn resolve(&self, name: &str) -> Option<PropertyId> {
        self.index.get(&normalize(name)).copied()
    }

    /// Resolve a reference made by `requester`, creating the node on a miss.
    ///
    /// A miss is not an error: configurations may refer to properties that a
    /// later component or collaborator produces.
    pub fn resolve_or_create(&mut self, name: &str, requester: &str) -> PropertyId {
        if let Some(id) = self.resolve(name) {
            return id;
        }
        warn!(
            property = %normalize(name),
            requester,
            "unresolved property reference, created with value 0.0"
        );
        self.create(name)
    }

    /// True if a node exists for `name`.
    pub fn has_node(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Canonical name of a node.
    pub fn name(&self, id: PropertyId) -> &str {
        self.slot(id).map(|s| s.name.as_str()).unwrap_or("")
    }

    /// Iterate over all node names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    /// Current value of a node.
    pub fn get(&self, id: PropertyId) -> f64 {
        match self.slot(id).map(|s| &s.binding) {
            Some(Binding::Value(v)) => *v,
            Some(Binding::Tied { getter, .. }) => getter(),
            None => 0.0,
        }
    }

    /// Write a node. Writes to read-only ties are dropped.
    pub fn set(&mut self, id: PropertyId, value: f64) {
        let Some(slot) = self.slots.get_mut(id.index() as usize) else {
            return;
        };
        match &mut slot.binding {
            Binding::Value(v) => *v = value,
            Binding::Tied {
                setter: Some(setter),
                ..
            } => setter(value),
            Binding::Tied { setter: None, .. } => {
                warn!(property = %slot.name, "write to read-only property ignored");
            }
        }
    }

    /// Current value by name, if the node exists.
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        self.resolve(name).map(|id| self.get(id))
    }

    /// Write an existing node by name.
    pub fn set_by_name(&mut self, name: &str, value: f64) -> PropertyResult<()> {
        let id = self.resolve(name).ok_or_else(|| PropertyError::NotFound {
            name: normalize(name),
        })?;
        self.set(id, value);
        Ok(())
    }

    /// Bind a node to external accessors.
    ///
    /// An existing untied node keeps its handle, so references resolved before
    /// the tie read through the accessors afterwards. A tie without a setter is
    /// read-only.
    pub fn tie(
        &mut self,
        name: &str,
        getter: Getter,
        setter: Option<Setter>,
    ) -> PropertyResult<PropertyId> {
        let key = normalize(name);
        if key.is_empty() {
            return Err(PropertyError::InvalidName {
                name: name.to_string(),
            });
        }
        let id = self.create(&key);
        let slot = &mut self.slots[id.index() as usize];
        if matches!(slot.binding, Binding::Tied { .. }) {
            return Err(PropertyError::AlreadyTied { name: key });
        }
        slot.binding = Binding::Tied { getter, setter };
        Ok(id)
    }

    /// Release a tie, freezing the node at its last read value.
    pub fn untie(&mut self, name: &str) -> PropertyResult<()> {
        let id = self.resolve(name).ok_or_else(|| PropertyError::NotFound {
            name: normalize(name),
        })?;
        let value = self.get(id);
        self.slots[id.index() as usize].binding = Binding::Value(value);
        Ok(())
    }

    /// True if the node is bound to external accessors.
    pub fn is_tied(&self, id: PropertyId) -> bool {
        matches!(
            self.slot(id).map(|s| &s.binding),
            Some(Binding::Tied { .. })
        )
    }

    fn slot(&self, id: PropertyId) -> Option<&Slot> {
        self.slots.get(id.index() as usize)
    }
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, slot) in self.slots.iter().enumerate() {
            let id = PropertyId::from_index(i as u32);
            map.entry(&slot.name, &self.get(id));
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn create_is_idempotent() {
        let mut store = PropertyStore::new();
        let a = store.create("fcs/a");
        let b = store.create("FCS/A");
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn tie_keeps_existing_handle() {
        let mut store = PropertyStore::new();
        let early = store.create("velocities/p-rad_sec");
        let rate = Rc::new(Cell::new(0.3));
        let r = Rc::clone(&rate);
        let tied = store
            .tie("velocities/p-rad_sec", Box::new(move || r.get()), None)
            .unwrap();
        assert_eq!(early, tied);
        assert_eq!(store.get(early), 0.3);
        rate.set(0.5);
        assert_eq!(store.get(early), 0.5);
    }

    #[test]
    fn read_only_tie_ignores_writes() {
        let mut store = PropertyStore::new();
        let id = store.tie("sim/const", Box::new(|| 7.0), None).unwrap();
        store.set(id, 1.0);
        assert_eq!(store.get(id), 7.0);
    }

    #[test]
    fn double_tie_is_rejected() {
        let mut store = PropertyStore::new();
        store.tie("a/b", Box::new(|| 1.0), None).unwrap();
        let err = store.tie("a/b", Box::new(|| 2.0), None).unwrap_err();
        assert_eq!(
            err,
            PropertyError::AlreadyTied {
                name: "a/b".to_string()
            }
        );
    }

    #[test]
    fn untie_freezes_value() {
        let mut store = PropertyStore::new();
        let id = store.tie("a/b", Box::new(|| 4.0), None).unwrap();
        store.untie("a/b").unwrap();
        assert!(!store.is_tied(id));
        store.set(id, 5.0);
        assert_eq!(store.get(id), 5.0);
    }
}
