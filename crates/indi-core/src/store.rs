//! Per-device property store
//!
//! Holds one collection per property kind, keyed by vector name. Insertion
//! order is preserved so that re-definitions are emitted in declaration order.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::value::{Blob, Number, PropertyKind, PropertyValue, Switch, Text};
use crate::vector::{AnyVector, Vector};

/// Vectors of one kind, keyed by name
pub type VectorMap<V> = IndexMap<String, Vector<V>>;

/// Values that have a dedicated collection in [`PropertyStore`]
pub trait Stored: PropertyValue + Sized {
    fn collection(store: &PropertyStore) -> &VectorMap<Self>;

    fn collection_mut(store: &mut PropertyStore) -> &mut VectorMap<Self>;
}

/// All property vectors of a single device
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyStore {
    texts: VectorMap<Text>,
    numbers: VectorMap<Number>,
    switches: VectorMap<Switch>,
    blobs: VectorMap<Blob>,
}

impl Stored for Text {
    fn collection(store: &PropertyStore) -> &VectorMap<Self> {
        &store.texts
    }

    fn collection_mut(store: &mut PropertyStore) -> &mut VectorMap<Self> {
        &mut store.texts
    }
}

impl Stored for Number {
    fn collection(store: &PropertyStore) -> &VectorMap<Self> {
        &store.numbers
    }

    fn collection_mut(store: &mut PropertyStore) -> &mut VectorMap<Self> {
        &mut store.numbers
    }
}

impl Stored for Switch {
    fn collection(store: &PropertyStore) -> &VectorMap<Self> {
        &store.switches
    }

    fn collection_mut(store: &mut PropertyStore) -> &mut VectorMap<Self> {
        &mut store.switches
    }
}

impl Stored for Blob {
    fn collection(store: &PropertyStore) -> &VectorMap<Self> {
        &store.blobs
    }

    fn collection_mut(store: &mut PropertyStore) -> &mut VectorMap<Self> {
        &mut store.blobs
    }
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vector, or merge it into the existing one of the same kind and name
    pub fn add_or_merge<V: Stored>(&mut self, vector: Vector<V>) {
        let collection = V::collection_mut(self);
        if let Some(existing) = collection.get_mut(&vector.name) {
            debug!(kind = %vector.kind(), vector = %vector.name, "Merging vector");
            existing.merge(vector);
        } else {
            debug!(kind = %vector.kind(), vector = %vector.name, "Adding vector");
            collection.insert(vector.name.clone(), vector);
        }
    }

    /// Insert a vector only if none of that kind and name exists yet
    ///
    /// Returns `true` when the vector was inserted.
    pub fn insert_if_absent<V: Stored>(&mut self, vector: Vector<V>) -> bool {
        if vector.name.is_empty() || self.vector::<V>(&vector.name).is_some() {
            return false;
        }
        debug!(kind = %V::KIND, vector = %vector.name, "Adding vector on first sight");
        V::collection_mut(self).insert(vector.name.clone(), vector);
        true
    }

    /// Add a vector of any kind through [`PropertyStore::add_or_merge`]
    pub fn add_any(&mut self, vector: AnyVector) {
        match vector {
            AnyVector::Text(v) => self.add_or_merge(v),
            AnyVector::Number(v) => self.add_or_merge(v),
            AnyVector::Switch(v) => self.add_or_merge(v),
            AnyVector::Blob(v) => self.add_or_merge(v),
        }
    }

    /// Look up a vector by name; an empty name never matches
    pub fn vector<V: Stored>(&self, name: &str) -> Option<&Vector<V>> {
        if name.is_empty() {
            return None;
        }
        V::collection(self).get(name)
    }

    pub fn vector_mut<V: Stored>(&mut self, name: &str) -> Option<&mut Vector<V>> {
        if name.is_empty() {
            return None;
        }
        V::collection_mut(self).get_mut(name)
    }

    /// Two-level lookup of a single value
    pub fn value<V: Stored>(&self, vector: &str, value: &str) -> Option<&V> {
        self.vector::<V>(vector).and_then(|v| v.value(value))
    }

    /// All vectors of one kind in insertion order
    pub fn vectors<'a, V: Stored + 'a>(&'a self) -> impl Iterator<Item = &'a Vector<V>> {
        V::collection(self).values()
    }

    pub fn text_vector(&self, name: &str) -> Option<&Vector<Text>> {
        self.vector(name)
    }

    pub fn number_vector(&self, name: &str) -> Option<&Vector<Number>> {
        self.vector(name)
    }

    pub fn switch_vector(&self, name: &str) -> Option<&Vector<Switch>> {
        self.vector(name)
    }

    pub fn blob_vector(&self, name: &str) -> Option<&Vector<Blob>> {
        self.vector(name)
    }

    /// Whether a vector of the given kind and name exists
    pub fn contains(&self, kind: PropertyKind, name: &str) -> bool {
        match kind {
            PropertyKind::Text => self.vector::<Text>(name).is_some(),
            PropertyKind::Number => self.vector::<Number>(name).is_some(),
            PropertyKind::Switch => self.vector::<Switch>(name).is_some(),
            PropertyKind::Blob => self.vector::<Blob>(name).is_some(),
        }
    }

    /// Kinds under which a vector with this name exists
    pub fn kinds_of(&self, name: &str) -> Vec<PropertyKind> {
        PropertyKind::ALL
            .into_iter()
            .filter(|k| self.contains(*k, name))
            .collect()
    }

    /// Remove the named vector from every collection that holds it
    ///
    /// Returns the kinds that were removed.
    pub fn delete(&mut self, name: &str) -> Vec<PropertyKind> {
        let mut removed = Vec::new();
        if name.is_empty() {
            return removed;
        }
        if self.texts.shift_remove(name).is_some() {
            removed.push(PropertyKind::Text);
        }
        if self.numbers.shift_remove(name).is_some() {
            removed.push(PropertyKind::Number);
        }
        if self.switches.shift_remove(name).is_some() {
            removed.push(PropertyKind::Switch);
        }
        if self.blobs.shift_remove(name).is_some() {
            removed.push(PropertyKind::Blob);
        }
        if !removed.is_empty() {
            debug!(vector = %name, kinds = ?removed, "Deleted vector");
        }
        removed
    }

    /// Distinct groups across all vectors
    pub fn groups(&self) -> BTreeSet<String> {
        let mut groups = BTreeSet::new();
        groups.extend(self.texts.values().map(|v| v.group.clone()));
        groups.extend(self.numbers.values().map(|v| v.group.clone()));
        groups.extend(self.switches.values().map(|v| v.group.clone()));
        groups.extend(self.blobs.values().map(|v| v.group.clone()));
        groups
    }

    /// Total number of vectors across all kinds
    pub fn len(&self) -> usize {
        self.texts.len() + self.numbers.len() + self.switches.len() + self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
