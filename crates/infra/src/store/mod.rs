//! Inventory persistence boundary.
//!
//! Handlers only ever see `dyn InventoryStore`; the concrete backend is picked
//! at startup (Postgres in production, in-memory for tests/dev).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use r#trait::{InventoryStore, SharedInventoryStore, StoreError};

use chrono::{NaiveDateTime, SubsecRound, Utc};

/// Receipt timestamp for a new record.
///
/// Truncated to microseconds so the value handed back on create is exactly
/// what a later read returns from Postgres.
pub(crate) fn received_now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}
