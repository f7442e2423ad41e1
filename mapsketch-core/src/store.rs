//! Ordered layer registry
//!
//! Insertion order is legend order and z-order. Ids are unique.

use crate::error::{LayerError, LayerResult};
use crate::model::Layer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    layers: Vec<Layer>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Insert a layer, replacing any layer with the same id in place.
    ///
    /// Returns the replaced layer, if there was one.
    pub fn insert(&mut self, layer: Layer) -> Option<Layer> {
        match self.position(&layer.id) {
            Some(idx) => Some(std::mem::replace(&mut self.layers[idx], layer)),
            None => {
                self.layers.push(layer);
                None
            }
        }
    }

    /// Append a layer, failing if the id is already taken
    pub fn try_insert(&mut self, layer: Layer) -> LayerResult<()> {
        if self.position(&layer.id).is_some() {
            return Err(LayerError::DuplicateLayer(layer.id));
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Layer> {
        self.position(id).map(|idx| self.layers.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.visible)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }
}

impl FromIterator<Layer> for LayerStore {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        let mut store = LayerStore::new();
        for layer in iter {
            store.insert(layer);
        }
        store
    }
}

impl<'a> IntoIterator for &'a LayerStore {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
