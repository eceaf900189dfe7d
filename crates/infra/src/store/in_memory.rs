use std::collections::BTreeMap;
use std::sync::RwLock;

use pantrykeeper_core::ItemId;
use pantrykeeper_inventory::{InventoryFilter, InventoryItem, ItemPatch, NewInventoryItem};

use super::r#trait::{InventoryStore, StoreError};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    items: BTreeMap<ItemId, InventoryItem>,
}

/// In-memory inventory store for tests/dev.
///
/// Writes are serialized by the lock, so each call is trivially atomic. Ids
/// come from a counter that only moves forward.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(operation: &str) -> StoreError {
    StoreError::unavailable(operation, "in-memory store lock poisoned")
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn list(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned("list"))?;
        Ok(state
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned("get"))?;
        Ok(state.items.get(&id).cloned())
    }

    async fn create(&self, item: NewInventoryItem) -> Result<InventoryItem, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned("create"))?;
        state.last_id += 1;
        let id = ItemId::new(state.last_id);
        let item = item.into_item(id, super::received_now());
        state.items.insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<InventoryItem>, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned("update"))?;
        Ok(state.items.get_mut(&id).map(|item| {
            patch.apply_to(item);
            item.clone()
        }))
    }

    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned("delete"))?;
        Ok(state.items.remove(&id).is_some())
    }
}
