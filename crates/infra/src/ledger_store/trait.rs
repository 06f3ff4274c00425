use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use storekeep_core::{DomainError, ProductId, StoreId, UserId};
use storekeep_ledger::{
    Adjustment, AppliedAdjustment, BulkEntry, BulkEntryResult, BulkOutcome, InventoryRecord,
    InventoryTransaction,
};

/// Storage-boundary error for ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerStoreError {
    /// No inventory record exists for the given (product, store) pair.
    #[error("inventory record not found")]
    NotFound,

    /// A record already exists for the given (product, store) pair.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The adjustment failed domain validation before any write.
    #[error("invalid adjustment: {0}")]
    Invalid(String),

    /// The underlying storage operation failed. Surfaced unchanged; no retry.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<DomainError> for LedgerStoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => LedgerStoreError::NotFound,
            DomainError::Conflict(msg) => LedgerStoreError::Conflict(msg),
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                LedgerStoreError::Invalid(msg)
            }
        }
    }
}

/// Persistence seam for the stock ledger.
///
/// `adjust` must be all-or-nothing: the record update and the transaction
/// append land together or not at all, and concurrent adjustments of the same
/// (product, store) pair must not lose updates. How that is achieved is the
/// implementation's business (a single write lock in memory, a row-locked
/// atomic statement in Postgres).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Provision a zero-quantity record for a product at a store.
    ///
    /// Fails with [`LedgerStoreError::Conflict`] if one already exists.
    async fn create(&self, record: InventoryRecord) -> Result<InventoryRecord, LedgerStoreError>;

    /// Look up the record for a (product, store) pair.
    async fn get(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<Option<InventoryRecord>, LedgerStoreError>;

    /// Apply one adjustment: clamp-update the record and append its audit
    /// entry as one unit of work.
    async fn adjust(&self, adjustment: &Adjustment)
    -> Result<AppliedAdjustment, LedgerStoreError>;

    /// Most recent transactions for a (product, store) pair, newest first.
    async fn recent_transactions(
        &self,
        product_id: ProductId,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<InventoryTransaction>, LedgerStoreError>;

    /// Apply a batch of adjustments within one store, in input order.
    ///
    /// Entries are independent: a failed entry is reported in its slot and the
    /// rest still land. There is no rollback and the batch itself never fails.
    async fn adjust_many(
        &self,
        store_id: StoreId,
        entries: &[BulkEntry],
        performed_by: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Vec<BulkEntryResult> {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let adjustment = entry.to_adjustment(store_id, performed_by, occurred_at);
            let outcome = match self.adjust(&adjustment).await {
                Ok(applied) => BulkOutcome::Applied {
                    previous_quantity: applied.transaction.previous_quantity,
                    new_quantity: applied.transaction.new_quantity,
                    transaction_id: applied.transaction.id,
                },
                Err(LedgerStoreError::NotFound) => BulkOutcome::Failed {
                    message: "inventory record not found".to_string(),
                },
                Err(e) => BulkOutcome::Failed {
                    message: e.to_string(),
                },
            };
            results.push(BulkEntryResult {
                product_id: entry.product_id,
                outcome,
            });
        }
        results
    }
}
