use std::collections::{BTreeMap, HashMap};

/// Index of a target in a [`TargetRegistry`]. Never reused, even after removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(u32);

/// Index of a property within one target's [`PropertyBag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyKey(u32);

/// A resolved `(target, property)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Binding {
    pub target: TargetId,
    pub key: PropertyKey,
}

/// Named scalar properties of one animated object (camera, panel, mesh transform).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    names: Vec<String>,
    values: Vec<f64>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self, name: &str) -> Option<PropertyKey> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| PropertyKey(i as u32))
    }

    /// Key for `name`, inserting it with `initial` if absent.
    pub fn ensure(&mut self, name: &str, initial: f64) -> PropertyKey {
        if let Some(key) = self.key(name) {
            return key;
        }
        self.names.push(name.to_owned());
        self.values.push(initial);
        PropertyKey((self.names.len() - 1) as u32)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.key(name).map(|k| self.values[k.0 as usize])
    }

    pub fn set(&mut self, name: &str, value: f64) {
        let key = self.ensure(name, value);
        self.values[key.0 as usize] = value;
    }

    pub fn value(&self, key: PropertyKey) -> f64 {
        self.values[key.0 as usize]
    }

    pub fn set_value(&mut self, key: PropertyKey, value: f64) {
        self.values[key.0 as usize] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (name, value) in iter {
            bag.set(name.as_ref(), value);
        }
        bag
    }
}

#[derive(Clone, Debug)]
struct Target {
    name: String,
    props: PropertyBag,
}

/// Arena of animated targets addressed by [`TargetId`].
///
/// Names are resolved once when a timeline starts; per-frame writes go straight to slot and
/// property indices. Removing a target leaves a tombstone so stale bindings fail softly.
#[derive(Clone, Debug, Default)]
pub struct TargetRegistry {
    slots: Vec<Option<Target>>,
    by_name: HashMap<String, TargetId>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with `props`, replacing any existing target of that name.
    pub fn insert(&mut self, name: impl Into<String>, props: PropertyBag) -> TargetId {
        let name = name.into();
        if let Some(old) = self.by_name.remove(&name) {
            self.slots[old.0 as usize] = None;
        }
        let id = TargetId(self.slots.len() as u32);
        self.slots.push(Some(Target {
            name: name.clone(),
            props,
        }));
        self.by_name.insert(name, id);
        id
    }

    /// Remove `name`. Bindings made against it stop writing.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.by_name.remove(name) {
            Some(id) => {
                self.slots[id.0 as usize] = None;
                true
            }
            None => false,
        }
    }

    pub fn id(&self, name: &str) -> Option<TargetId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn props(&self, id: TargetId) -> Option<&PropertyBag> {
        self.slots.get(id.0 as usize)?.as_ref().map(|t| &t.props)
    }

    pub fn props_mut(&mut self, id: TargetId) -> Option<&mut PropertyBag> {
        self.slots.get_mut(id.0 as usize)?.as_mut().map(|t| &mut t.props)
    }

    /// Current value of `property` on `target`, by name.
    pub fn get(&self, target: &str, property: &str) -> Option<f64> {
        self.props(self.id(target)?)?.get(property)
    }

    /// Resolve `(target, property)`, creating the property with `initial` if the target lacks it.
    pub fn bind(&mut self, target: &str, property: &str, initial: f64) -> Option<Binding> {
        let id = self.id(target)?;
        let key = self.props_mut(id)?.ensure(property, initial);
        Some(Binding { target: id, key })
    }

    /// Write through a binding. Returns `false` if the target has been removed.
    pub fn write(&mut self, binding: Binding, value: f64) -> bool {
        match self.props_mut(binding.target) {
            Some(props) => {
                props.set_value(binding.key, value);
                true
            }
            None => false,
        }
    }

    pub fn read(&self, binding: Binding) -> Option<f64> {
        self.props(binding.target).map(|p| p.value(binding.key))
    }

    /// Live targets and their properties, ordered by name.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.slots
            .iter()
            .flatten()
            .map(|t| {
                let props = t.props.iter().map(|(k, v)| (k.to_owned(), v)).collect();
                (t.name.clone(), props)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/target.rs"]
mod tests;
