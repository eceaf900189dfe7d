//! List filters for the inventory collection.

use crate::item::InventoryItem;

/// Items with a quantity strictly below this are "low stock".
pub const LOW_STOCK_THRESHOLD: i32 = 10;

pub fn is_low_stock(quantity: i32) -> bool {
    quantity < LOW_STOCK_THRESHOLD
}

/// Conjunction of the optional list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    /// Exact, case-sensitive category match.
    pub category: Option<String>,
    pub low_stock: bool,
}

impl InventoryFilter {
    /// Build a filter from raw query-string values.
    ///
    /// An empty `category` means no category filter; `low_stock` is only
    /// enabled by the literal `true`.
    pub fn from_query(category: Option<&str>, low_stock: Option<&str>) -> Self {
        Self {
            category: category.filter(|c| !c.is_empty()).map(str::to_string),
            low_stock: low_stock == Some("true"),
        }
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(category) = &self.category {
            if item.category != *category {
                return false;
            }
        }
        if self.low_stock && !is_low_stock(item.quantity) {
            return false;
        }
        true
    }
}
