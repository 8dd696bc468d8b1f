//! The in-memory inventory collection that ingestion fills and reconciliation updates.

use crate::model::{InventoryItem, ItemId};
use serde::{Deserialize, Serialize};

/// The ordered collection of items, owned by whoever drives the runs and passed by reference into
/// them. Order is the order of ingestion and nothing but a new ingestion or a deletion changes it.
///
/// No locking happens here; callers serialize access so that only one run works on an inventory
/// at a time.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    /// Discards the current contents in favor of `items`.
    pub fn replace_all(&mut self, items: Vec<InventoryItem>) {
        self.items = items;
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Removes the item with `id`, returning it if it was present.
    pub fn remove(&mut self, id: &ItemId) -> Option<InventoryItem> {
        let ix = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(ix))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut InventoryItem> {
        self.items.iter_mut()
    }

    pub fn into_items(self) -> Vec<InventoryItem> {
        self.items
    }
}
