use std::sync::Arc;

use anyhow::Context;

use pantrykeeper_infra::{
    AppConfig, InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, SharedInventoryStore,
};

/// Capabilities handed to every request handler.
#[derive(Clone)]
pub struct AppServices {
    store: SharedInventoryStore,
}

impl AppServices {
    pub fn new(store: SharedInventoryStore) -> Self {
        Self { store }
    }

    /// Services backed by a fresh in-memory store (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryInventoryStore::new()))
    }

    pub fn store(&self) -> &dyn InventoryStore {
        self.store.as_ref()
    }
}

/// Pick the store according to `USE_PERSISTENT_STORES`.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    if !config.use_persistent_store {
        tracing::warn!("USE_PERSISTENT_STORES=false; inventory lives in memory and is lost on exit");
        return Ok(AppServices::in_memory());
    }

    let store = PostgresInventoryStore::connect(&config.database)
        .await
        .context("failed to connect to Postgres")?;
    store
        .ensure_schema()
        .await
        .context("failed to prepare the inventory table")?;

    tracing::info!("using Postgres inventory store");
    Ok(AppServices::new(Arc::new(store)))
}
