use std::sync::Arc;

use thiserror::Error;

use pantrykeeper_core::ItemId;
use pantrykeeper_inventory::{InventoryFilter, InventoryItem, ItemPatch, NewInventoryItem};

/// Store operation error.
///
/// These are **infrastructure errors** (connectivity, constraints, decoding) as
/// opposed to domain errors (validation, lookups). Every variant surfaces to
/// clients as a server error; the message ends up in the envelope's `error`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A table constraint rejected the write (not-null, length, check, unique).
    #[error("constraint violation in {operation}: {message}")]
    Constraint { operation: String, message: String },

    /// A row could not be decoded into an `InventoryItem`.
    #[error("failed to decode row in {operation}: {message}")]
    Decode { operation: String, message: String },

    /// The backend could not be reached or the pool is gone.
    #[error("store unavailable in {operation}: {message}")]
    Unavailable { operation: String, message: String },

    /// Any other database failure.
    #[error("database error in {operation}: {message}")]
    Database { operation: String, message: String },
}

impl StoreError {
    pub fn unavailable(operation: &str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

/// Relational store for inventory records.
///
/// ## Write Semantics
///
/// `create`, `update` and `delete` are each one atomic unit: either every
/// change of the call is committed or none is. Implementations roll back
/// explicitly before returning an error.
///
/// ## Lookups
///
/// A missing record is not an error at this layer: `get`/`update` return
/// `Ok(None)` and `delete` returns `Ok(false)`.
///
/// ## Identity
///
/// `create` assigns `id` and `date_received`. Identifiers are never reused,
/// including after deletes.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    /// All records matching `filter`. No ordering is promised.
    async fn list(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>, StoreError>;

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError>;

    async fn create(&self, item: NewInventoryItem) -> Result<InventoryItem, StoreError>;

    /// Apply `patch` to the record and return the updated row.
    async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<InventoryItem>, StoreError>;

    /// Hard delete. Returns whether a record was removed.
    async fn delete(&self, id: ItemId) -> Result<bool, StoreError>;
}

/// Shared handle injected into request handlers.
pub type SharedInventoryStore = Arc<dyn InventoryStore>;
