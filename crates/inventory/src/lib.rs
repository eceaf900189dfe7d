//! Inventory domain module.
//!
//! This crate contains the rules for donated-food inventory records, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod filter;
pub mod item;

pub use filter::{InventoryFilter, LOW_STOCK_THRESHOLD, is_low_stock};
pub use item::{InventoryItem, ItemPatch, NewInventoryItem, REQUIRED_FIELDS};
