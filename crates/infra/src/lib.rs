//! Infrastructure layer: relational store, configuration.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError, DatabaseConfig, Environment};
pub use store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, SharedInventoryStore, StoreError};
