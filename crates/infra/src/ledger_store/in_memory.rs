use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storekeep_core::{ProductId, StoreId};
use storekeep_ledger::{Adjustment, AppliedAdjustment, InventoryRecord, InventoryTransaction};

use super::r#trait::{LedgerStore, LedgerStoreError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    product_id: ProductId,
    store_id: StoreId,
}

/// In-memory ledger store.
///
/// Intended for tests/dev. The whole adjust (read, clamp, write, append) runs
/// under one write lock, so concurrent adjustments cannot lose updates.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    records: RwLock<HashMap<RecordKey, InventoryRecord>>,
    transactions: RwLock<Vec<InventoryTransaction>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> LedgerStoreError {
        LedgerStoreError::Storage("lock poisoned".to_string())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create(&self, record: InventoryRecord) -> Result<InventoryRecord, LedgerStoreError> {
        let key = RecordKey {
            product_id: record.product_id,
            store_id: record.store_id,
        };

        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        if records.contains_key(&key) {
            return Err(LedgerStoreError::Conflict(format!(
                "inventory record already exists for product {}",
                record.product_id
            )));
        }
        records.insert(key, record.clone());
        Ok(record)
    }

    async fn get(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<Option<InventoryRecord>, LedgerStoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records
            .get(&RecordKey {
                product_id,
                store_id,
            })
            .cloned())
    }

    async fn adjust(
        &self,
        adjustment: &Adjustment,
    ) -> Result<AppliedAdjustment, LedgerStoreError> {
        // Validate before touching state so a bad command never half-applies.
        adjustment.validate()?;

        let key = RecordKey {
            product_id: adjustment.product_id,
            store_id: adjustment.store_id,
        };

        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let record = records.get(&key).ok_or(LedgerStoreError::NotFound)?;

        let applied = adjustment.apply(record)?;

        // Both writes happen under the records write lock: the record update
        // and the audit append are one unit of work.
        let mut transactions = self.transactions.write().map_err(|_| Self::poisoned())?;
        records.insert(key, applied.record.clone());
        transactions.push(applied.transaction.clone());

        Ok(applied)
    }

    async fn recent_transactions(
        &self,
        product_id: ProductId,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<InventoryTransaction>, LedgerStoreError> {
        let transactions = self.transactions.read().map_err(|_| Self::poisoned())?;
        Ok(transactions
            .iter()
            .rev()
            .filter(|t| t.product_id == product_id && t.store_id == store_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
