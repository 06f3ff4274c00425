use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{ProductId, StoreId};

/// Where a product physically lives inside a store. Free-form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocation {
    pub aisle: Option<String>,
    pub shelf: Option<String>,
    pub bin: Option<String>,
}

/// On-hand stock for one (product, store) pair.
///
/// Uniquely keyed by `(product_id, store_id)`. Created once per product with
/// quantity 0 and mutated only through [`crate::Adjustment`]; `available_quantity`
/// is derived and recomputed on every mutation, never set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub store_id: StoreId,

    /// Physical on-hand quantity. Never negative (adjustments clamp at zero).
    pub quantity: i64,

    /// Quantity held back for pending orders. Never negative.
    pub reserved_quantity: i64,

    /// Derived: `max(0, quantity - reserved_quantity)`.
    pub available_quantity: i64,

    pub reorder_point: i64,
    pub max_stock: i64,

    pub location: StockLocation,

    /// Set only when a positive adjustment lands.
    pub last_restocked: Option<DateTime<Utc>>,

    /// Set on every mutation.
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    /// Default reorder threshold for newly provisioned records.
    pub const DEFAULT_REORDER_POINT: i64 = 10;

    /// Default stock ceiling for newly provisioned records.
    pub const DEFAULT_MAX_STOCK: i64 = 100;

    /// Provision an empty record for a product at a store (quantity 0).
    pub fn provision(product_id: ProductId, store_id: StoreId, now: DateTime<Utc>) -> Self {
        Self {
            product_id,
            store_id,
            quantity: 0,
            reserved_quantity: 0,
            available_quantity: 0,
            reorder_point: Self::DEFAULT_REORDER_POINT,
            max_stock: Self::DEFAULT_MAX_STOCK,
            location: StockLocation::default(),
            last_restocked: None,
            last_updated: now,
        }
    }

    /// Recompute the derived available quantity from on-hand and reserved.
    ///
    /// Must run immediately before persistence on every mutation path.
    pub fn recompute_available(&mut self) {
        self.available_quantity = (self.quantity - self.reserved_quantity).max(0);
    }

    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_point
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}
