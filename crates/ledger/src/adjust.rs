//! The adjust operation: signed delta in, updated record + audit entry out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{DomainError, DomainResult, ProductId, StoreId, TransactionId, UserId};

use crate::record::InventoryRecord;
use crate::transaction::{InventoryTransaction, SupplierRef, TransactionType};

/// Command: apply a signed quantity delta to one (product, store) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub product_id: ProductId,
    pub store_id: StoreId,

    /// Signed change: positive = stock in, negative = stock out/consumption.
    pub delta: i64,

    pub transaction_type: TransactionType,
    pub reason: String,
    pub notes: Option<String>,
    pub reference: Option<String>,

    /// Minor currency units (cents), when cost is known.
    pub unit_cost: Option<i64>,
    pub supplier: Option<SupplierRef>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,

    pub performed_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

impl Adjustment {
    /// Validate the command before any persistence is attempted.
    pub fn validate(&self) -> DomainResult<()> {
        if self.reason.trim().is_empty() {
            return Err(DomainError::validation("reason is required"));
        }
        Ok(())
    }

    /// Apply this adjustment to a record, producing the updated record and the
    /// audit-trail entry as one unit.
    ///
    /// Clamp policy: over-subtraction floors the new quantity at zero instead of
    /// failing. Callers needing strict validation must check availability first.
    pub fn apply(&self, record: &InventoryRecord) -> DomainResult<AppliedAdjustment> {
        self.validate()?;
        if record.product_id != self.product_id || record.store_id != self.store_id {
            return Err(DomainError::validation("adjustment targets a different record"));
        }

        let previous_quantity = record.quantity;
        let new_quantity = previous_quantity.saturating_add(self.delta).max(0);

        let mut updated = record.clone();
        updated.quantity = new_quantity;
        if self.delta > 0 {
            updated.last_restocked = Some(self.occurred_at);
        }
        updated.last_updated = self.occurred_at;
        updated.recompute_available();

        let quantity = self.delta.saturating_abs();
        let transaction = InventoryTransaction {
            id: TransactionId::new(),
            product_id: self.product_id,
            store_id: self.store_id,
            transaction_type: self.transaction_type,
            quantity,
            previous_quantity,
            new_quantity,
            reason: self.reason.clone(),
            notes: self.notes.clone(),
            reference: self.reference.clone(),
            reference_id: None,
            unit_cost: self.unit_cost,
            total_cost: self.unit_cost.map(|c| c.saturating_mul(quantity)),
            supplier: self.supplier.clone(),
            batch_number: self.batch_number.clone(),
            expiry_date: self.expiry_date,
            performed_by: self.performed_by,
            created_at: self.occurred_at,
        };

        Ok(AppliedAdjustment {
            record: updated,
            transaction,
        })
    }
}

/// Result of a successful adjust: the updated record and the transaction that
/// recorded it, returned together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    pub record: InventoryRecord,
    pub transaction: InventoryTransaction,
}

/// One entry of a bulk adjustment, applied independently within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEntry {
    pub product_id: ProductId,
    pub delta: i64,
    pub reason: String,
    #[serde(default = "default_bulk_type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_bulk_type() -> TransactionType {
    TransactionType::Adjustment
}

impl BulkEntry {
    /// Expand a bulk entry to a full adjustment command.
    pub fn to_adjustment(
        &self,
        store_id: StoreId,
        performed_by: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Adjustment {
        Adjustment {
            product_id: self.product_id,
            store_id,
            delta: self.delta,
            transaction_type: self.transaction_type,
            reason: self.reason.clone(),
            notes: self.notes.clone(),
            reference: None,
            unit_cost: None,
            supplier: None,
            batch_number: None,
            expiry_date: None,
            performed_by,
            occurred_at,
        }
    }
}

/// Per-entry outcome of a bulk adjustment.
///
/// The batch never rolls back: each entry either landed (record update plus
/// transaction) or failed on its own, and the aggregate report carries both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkOutcome {
    Applied {
        previous_quantity: i64,
        new_quantity: i64,
        transaction_id: TransactionId,
    },
    Failed {
        message: String,
    },
}

impl BulkOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, BulkOutcome::Applied { .. })
    }
}

/// Outcome of one bulk entry, tagged with the product it targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEntryResult {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record(quantity: i64) -> InventoryRecord {
        let mut record =
            InventoryRecord::provision(ProductId::new(), StoreId::new(), Utc::now());
        record.quantity = quantity;
        record.recompute_available();
        record
    }

    fn test_adjustment(record: &InventoryRecord, delta: i64) -> Adjustment {
        Adjustment {
            product_id: record.product_id,
            store_id: record.store_id,
            delta,
            transaction_type: TransactionType::Adjustment,
            reason: "cycle count".to_string(),
            notes: None,
            reference: None,
            unit_cost: None,
            supplier: None,
            batch_number: None,
            expiry_date: None,
            performed_by: UserId::new(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn positive_delta_adds_stock_and_stamps_restock() {
        let record = test_record(10);
        let adjustment = test_adjustment(&record, 3);

        let applied = adjustment.apply(&record).unwrap();
        assert_eq!(applied.record.quantity, 13);
        assert_eq!(applied.record.last_restocked, Some(adjustment.occurred_at));
        assert_eq!(applied.record.last_updated, adjustment.occurred_at);
    }

    #[test]
    fn negative_delta_leaves_last_restocked_untouched() {
        let mut record = test_record(10);
        let earlier = Utc::now() - chrono::Duration::days(2);
        record.last_restocked = Some(earlier);

        let applied = test_adjustment(&record, -2).apply(&record).unwrap();
        assert_eq!(applied.record.quantity, 8);
        assert_eq!(applied.record.last_restocked, Some(earlier));
    }

    #[test]
    fn over_subtraction_clamps_to_zero() {
        let record = test_record(5);
        let applied = test_adjustment(&record, -8).apply(&record).unwrap();

        assert_eq!(applied.record.quantity, 0);
        assert_eq!(applied.transaction.previous_quantity, 5);
        assert_eq!(applied.transaction.new_quantity, 0);
        assert_eq!(applied.transaction.quantity, 8);
    }

    #[test]
    fn oversell_scenario_records_full_magnitude() {
        // quantity 20, sale of 25: clamp to 0, transaction carries |delta| = 25.
        let record = test_record(20);
        let mut adjustment = test_adjustment(&record, -25);
        adjustment.transaction_type = TransactionType::Out;
        adjustment.reason = "sale".to_string();

        let applied = adjustment.apply(&record).unwrap();
        assert_eq!(applied.record.quantity, 0);
        assert_eq!(applied.transaction.previous_quantity, 20);
        assert_eq!(applied.transaction.new_quantity, 0);
        assert_eq!(applied.transaction.quantity, 25);
        assert_eq!(applied.transaction.transaction_type, TransactionType::Out);
    }

    #[test]
    fn transaction_matches_record_before_and_after() {
        let record = test_record(7);
        let applied = test_adjustment(&record, 4).apply(&record).unwrap();

        assert_eq!(applied.transaction.previous_quantity, 7);
        assert_eq!(applied.transaction.new_quantity, applied.record.quantity);
        assert_eq!(applied.transaction.quantity, 4);
        assert_eq!(applied.transaction.reason, "cycle count");
    }

    #[test]
    fn available_quantity_respects_reservations() {
        let mut record = test_record(10);
        record.reserved_quantity = 4;
        record.recompute_available();

        let applied = test_adjustment(&record, -3).apply(&record).unwrap();
        assert_eq!(applied.record.quantity, 7);
        assert_eq!(applied.record.available_quantity, 3);

        let applied = test_adjustment(&record, -9).apply(&record).unwrap();
        assert_eq!(applied.record.quantity, 1);
        assert_eq!(applied.record.available_quantity, 0);
    }

    #[test]
    fn blank_reason_is_rejected() {
        let record = test_record(10);
        let mut adjustment = test_adjustment(&record, 1);
        adjustment.reason = "   ".to_string();

        assert!(matches!(
            adjustment.apply(&record),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn zero_delta_is_accepted_and_does_not_restock() {
        let record = test_record(10);
        let applied = test_adjustment(&record, 0).apply(&record).unwrap();

        assert_eq!(applied.record.quantity, 10);
        assert_eq!(applied.record.last_restocked, None);
        assert_eq!(applied.transaction.quantity, 0);
    }

    #[test]
    fn unit_cost_extends_to_total_cost() {
        let record = test_record(0);
        let mut adjustment = test_adjustment(&record, 12);
        adjustment.transaction_type = TransactionType::In;
        adjustment.unit_cost = Some(250);

        let applied = adjustment.apply(&record).unwrap();
        assert_eq!(applied.transaction.unit_cost, Some(250));
        assert_eq!(applied.transaction.total_cost, Some(3000));
    }

    #[test]
    fn mismatched_record_is_rejected() {
        let record = test_record(10);
        let other = test_record(10);
        let adjustment = test_adjustment(&other, 1);

        assert!(matches!(
            adjustment.apply(&record),
            Err(DomainError::Validation(_))
        ));
    }
}
