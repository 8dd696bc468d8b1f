use crate::db::Store;
use crate::model::{InventoryItem, ItemId};
use crate::Res;
use async_trait::async_trait;
use std::sync::Mutex;

/// A `Store` that keeps the items in memory, for embedding the engine without a database and for
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<InventoryItem>>,
}

impl MemoryStore {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<InventoryItem>> {
        // The data is replaced wholesale, so a poisoned lock still holds a consistent list
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn replace_all(&self, items: &[InventoryItem]) -> Res<()> {
        *self.lock() = items.to_vec();
        Ok(())
    }

    async fn load_all(&self) -> Res<Vec<InventoryItem>> {
        Ok(self.lock().clone())
    }

    async fn delete(&self, id: &ItemId) -> Res<bool> {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|item| item.id() != id);
        Ok(items.len() < before)
    }
}
