//! Postgres-backed ledger store implementation.
//!
//! Inventory records and their transaction log live in two tables:
//!
//! ```sql
//! CREATE TABLE inventory (
//!     product_id         UUID NOT NULL,
//!     store_id           UUID NOT NULL,
//!     quantity           BIGINT NOT NULL DEFAULT 0 CHECK (quantity >= 0),
//!     reserved_quantity  BIGINT NOT NULL DEFAULT 0 CHECK (reserved_quantity >= 0),
//!     available_quantity BIGINT NOT NULL DEFAULT 0 CHECK (available_quantity >= 0),
//!     reorder_point      BIGINT NOT NULL DEFAULT 10,
//!     max_stock          BIGINT NOT NULL DEFAULT 100,
//!     aisle              TEXT,
//!     shelf              TEXT,
//!     bin                TEXT,
//!     last_restocked     TIMESTAMPTZ,
//!     last_updated       TIMESTAMPTZ NOT NULL,
//!     PRIMARY KEY (product_id, store_id)
//! );
//!
//! CREATE TABLE inventory_transactions (
//!     id                UUID PRIMARY KEY,
//!     product_id        UUID NOT NULL,
//!     store_id          UUID NOT NULL,
//!     transaction_type  TEXT NOT NULL,
//!     quantity          BIGINT NOT NULL,
//!     previous_quantity BIGINT NOT NULL,
//!     new_quantity      BIGINT NOT NULL,
//!     reason            TEXT NOT NULL,
//!     notes             TEXT,
//!     reference         TEXT,
//!     reference_id      UUID,
//!     unit_cost         BIGINT,
//!     total_cost        BIGINT,
//!     supplier_name     TEXT,
//!     supplier_id       TEXT,
//!     batch_number      TEXT,
//!     expiry_date       TIMESTAMPTZ,
//!     performed_by      UUID NOT NULL,
//!     created_at        TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX ix_inventory_transactions_record
//!     ON inventory_transactions (product_id, store_id, created_at DESC);
//! ```
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `LedgerStoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | LedgerStoreError | Scenario |
//! |------------|----------------------|------------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Provisioning an already-provisioned (product, store) pair |
//! | Database (check constraint violation) | `23514` | `Storage` | Data outside schema constraints (should not occur: the clamp keeps quantities non-negative) |
//! | Database (other) | Any other | `Storage` | Other database errors |
//! | Other | N/A | `Storage` | Network errors, pool closed, connection failures |
//!
//! ## Concurrency
//!
//! Reading the quantity in application code and writing the clamped result
//! back would let two concurrent adjustments lose an update. Here the clamp
//! runs inside a single row-locked `UPDATE … RETURNING` and the transaction
//! insert shares the same SQL transaction: concurrent adjustments of one
//! (product, store) pair serialize at the row and the audit entry can never be
//! orphaned from its record update.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use storekeep_core::{ProductId, StoreId, TransactionId, UserId};
use storekeep_ledger::{
    Adjustment, AppliedAdjustment, InventoryRecord, InventoryTransaction, StockLocation,
    SupplierRef, TransactionType,
};

use super::r#trait::{LedgerStore, LedgerStoreError};

/// Postgres-backed ledger store.
///
/// `Send + Sync`; clones share the underlying SQLx pool.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(
        skip(self, record),
        fields(product_id = %record.product_id, store_id = %record.store_id),
        err
    )]
    async fn create(&self, record: InventoryRecord) -> Result<InventoryRecord, LedgerStoreError> {
        sqlx::query(
            r#"
            INSERT INTO inventory (
                product_id, store_id, quantity, reserved_quantity, available_quantity,
                reorder_point, max_stock, aisle, shelf, bin, last_restocked, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.product_id.as_uuid())
        .bind(record.store_id.as_uuid())
        .bind(record.quantity)
        .bind(record.reserved_quantity)
        .bind(record.available_quantity)
        .bind(record.reorder_point)
        .bind(record.max_stock)
        .bind(record.location.aisle.as_deref())
        .bind(record.location.shelf.as_deref())
        .bind(record.location.bin.as_deref())
        .bind(record.last_restocked)
        .bind(record.last_updated)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        Ok(record)
    }

    #[instrument(skip(self), fields(product_id = %product_id, store_id = %store_id), err)]
    async fn get(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<Option<InventoryRecord>, LedgerStoreError> {
        let row = sqlx::query(
            r#"
            SELECT product_id, store_id, quantity, reserved_quantity, available_quantity,
                   reorder_point, max_stock, aisle, shelf, bin, last_restocked, last_updated
            FROM inventory
            WHERE product_id = $1 AND store_id = $2
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| record_from_row(&r)).transpose()
    }

    #[instrument(
        skip(self, adjustment),
        fields(
            product_id = %adjustment.product_id,
            store_id = %adjustment.store_id,
            delta = adjustment.delta
        ),
        err
    )]
    async fn adjust(
        &self,
        adjustment: &Adjustment,
    ) -> Result<AppliedAdjustment, LedgerStoreError> {
        adjustment.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("adjust.begin", e))?;

        // Clamp, restock stamp, and derived-availability recompute in one
        // row-locked statement; `before` carries the pre-update quantity out.
        let row = sqlx::query(
            r#"
            WITH before AS (
                SELECT quantity AS previous_quantity
                FROM inventory
                WHERE product_id = $1 AND store_id = $2
                FOR UPDATE
            )
            UPDATE inventory AS inv
            SET quantity = GREATEST(0, before.previous_quantity + $3),
                available_quantity =
                    GREATEST(0, GREATEST(0, before.previous_quantity + $3) - inv.reserved_quantity),
                last_restocked = CASE WHEN $3 > 0 THEN $4 ELSE inv.last_restocked END,
                last_updated = $4
            FROM before
            WHERE inv.product_id = $1 AND inv.store_id = $2
            RETURNING before.previous_quantity,
                      inv.product_id, inv.store_id, inv.quantity, inv.reserved_quantity,
                      inv.available_quantity, inv.reorder_point, inv.max_stock,
                      inv.aisle, inv.shelf, inv.bin, inv.last_restocked, inv.last_updated
            "#,
        )
        .bind(adjustment.product_id.as_uuid())
        .bind(adjustment.store_id.as_uuid())
        .bind(adjustment.delta)
        .bind(adjustment.occurred_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("adjust.update", e))?;

        // No row means no record: the update never ran and the transaction
        // rolls back on drop with nothing written.
        let row = row.ok_or(LedgerStoreError::NotFound)?;

        let previous_quantity: i64 = row
            .try_get("previous_quantity")
            .map_err(|e| decode_error("previous_quantity", e))?;
        let record = record_from_row(&row)?;

        let quantity = adjustment.delta.saturating_abs();
        let transaction = InventoryTransaction {
            id: TransactionId::new(),
            product_id: adjustment.product_id,
            store_id: adjustment.store_id,
            transaction_type: adjustment.transaction_type,
            quantity,
            previous_quantity,
            new_quantity: record.quantity,
            reason: adjustment.reason.clone(),
            notes: adjustment.notes.clone(),
            reference: adjustment.reference.clone(),
            reference_id: None,
            unit_cost: adjustment.unit_cost,
            total_cost: adjustment.unit_cost.map(|c| c.saturating_mul(quantity)),
            supplier: adjustment.supplier.clone(),
            batch_number: adjustment.batch_number.clone(),
            expiry_date: adjustment.expiry_date,
            performed_by: adjustment.performed_by,
            created_at: adjustment.occurred_at,
        };

        sqlx::query(
            r#"
            INSERT INTO inventory_transactions (
                id, product_id, store_id, transaction_type,
                quantity, previous_quantity, new_quantity,
                reason, notes, reference, reference_id,
                unit_cost, total_cost, supplier_name, supplier_id,
                batch_number, expiry_date, performed_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.product_id.as_uuid())
        .bind(transaction.store_id.as_uuid())
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.quantity)
        .bind(transaction.previous_quantity)
        .bind(transaction.new_quantity)
        .bind(&transaction.reason)
        .bind(transaction.notes.as_deref())
        .bind(transaction.reference.as_deref())
        .bind(transaction.reference_id.map(|id| *id.as_uuid()))
        .bind(transaction.unit_cost)
        .bind(transaction.total_cost)
        .bind(
            transaction
                .supplier
                .as_ref()
                .and_then(|s| s.name.as_deref()),
        )
        .bind(transaction.supplier.as_ref().and_then(|s| s.id.as_deref()))
        .bind(transaction.batch_number.as_deref())
        .bind(transaction.expiry_date)
        .bind(transaction.performed_by.as_uuid())
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("adjust.insert_transaction", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("adjust.commit", e))?;

        Ok(AppliedAdjustment {
            record,
            transaction,
        })
    }

    #[instrument(skip(self), fields(product_id = %product_id, store_id = %store_id), err)]
    async fn recent_transactions(
        &self,
        product_id: ProductId,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<InventoryTransaction>, LedgerStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, store_id, transaction_type,
                   quantity, previous_quantity, new_quantity,
                   reason, notes, reference, reference_id,
                   unit_cost, total_cost, supplier_name, supplier_id,
                   batch_number, expiry_date, performed_by, created_at
            FROM inventory_transactions
            WHERE product_id = $1 AND store_id = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(limit.max(0))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("recent_transactions", e))?;

        rows.iter().map(transaction_from_row).collect()
    }
}

fn record_from_row(row: &PgRow) -> Result<InventoryRecord, LedgerStoreError> {
    Ok(InventoryRecord {
        product_id: ProductId::from_uuid(
            row.try_get("product_id")
                .map_err(|e| decode_error("product_id", e))?,
        ),
        store_id: StoreId::from_uuid(
            row.try_get("store_id")
                .map_err(|e| decode_error("store_id", e))?,
        ),
        quantity: row
            .try_get("quantity")
            .map_err(|e| decode_error("quantity", e))?,
        reserved_quantity: row
            .try_get("reserved_quantity")
            .map_err(|e| decode_error("reserved_quantity", e))?,
        available_quantity: row
            .try_get("available_quantity")
            .map_err(|e| decode_error("available_quantity", e))?,
        reorder_point: row
            .try_get("reorder_point")
            .map_err(|e| decode_error("reorder_point", e))?,
        max_stock: row
            .try_get("max_stock")
            .map_err(|e| decode_error("max_stock", e))?,
        location: StockLocation {
            aisle: row.try_get("aisle").map_err(|e| decode_error("aisle", e))?,
            shelf: row.try_get("shelf").map_err(|e| decode_error("shelf", e))?,
            bin: row.try_get("bin").map_err(|e| decode_error("bin", e))?,
        },
        last_restocked: row
            .try_get("last_restocked")
            .map_err(|e| decode_error("last_restocked", e))?,
        last_updated: row
            .try_get("last_updated")
            .map_err(|e| decode_error("last_updated", e))?,
    })
}

fn transaction_from_row(row: &PgRow) -> Result<InventoryTransaction, LedgerStoreError> {
    let transaction_type: String = row
        .try_get("transaction_type")
        .map_err(|e| decode_error("transaction_type", e))?;
    let transaction_type: TransactionType = transaction_type
        .parse()
        .map_err(|_| LedgerStoreError::Storage(format!(
            "stored transaction_type is not a known kind: {transaction_type}"
        )))?;

    let supplier_name: Option<String> = row
        .try_get("supplier_name")
        .map_err(|e| decode_error("supplier_name", e))?;
    let supplier_id: Option<String> = row
        .try_get("supplier_id")
        .map_err(|e| decode_error("supplier_id", e))?;
    let supplier = if supplier_name.is_some() || supplier_id.is_some() {
        Some(SupplierRef {
            name: supplier_name,
            id: supplier_id,
        })
    } else {
        None
    };

    Ok(InventoryTransaction {
        id: TransactionId::from_uuid(row.try_get("id").map_err(|e| decode_error("id", e))?),
        product_id: ProductId::from_uuid(
            row.try_get("product_id")
                .map_err(|e| decode_error("product_id", e))?,
        ),
        store_id: StoreId::from_uuid(
            row.try_get("store_id")
                .map_err(|e| decode_error("store_id", e))?,
        ),
        transaction_type,
        quantity: row
            .try_get("quantity")
            .map_err(|e| decode_error("quantity", e))?,
        previous_quantity: row
            .try_get("previous_quantity")
            .map_err(|e| decode_error("previous_quantity", e))?,
        new_quantity: row
            .try_get("new_quantity")
            .map_err(|e| decode_error("new_quantity", e))?,
        reason: row
            .try_get("reason")
            .map_err(|e| decode_error("reason", e))?,
        notes: row.try_get("notes").map_err(|e| decode_error("notes", e))?,
        reference: row
            .try_get("reference")
            .map_err(|e| decode_error("reference", e))?,
        reference_id: row
            .try_get::<Option<Uuid>, _>("reference_id")
            .map_err(|e| decode_error("reference_id", e))?
            .map(TransactionId::from_uuid),
        unit_cost: row
            .try_get("unit_cost")
            .map_err(|e| decode_error("unit_cost", e))?,
        total_cost: row
            .try_get("total_cost")
            .map_err(|e| decode_error("total_cost", e))?,
        supplier,
        batch_number: row
            .try_get("batch_number")
            .map_err(|e| decode_error("batch_number", e))?,
        expiry_date: row
            .try_get("expiry_date")
            .map_err(|e| decode_error("expiry_date", e))?,
        performed_by: UserId::from_uuid(
            row.try_get("performed_by")
                .map_err(|e| decode_error("performed_by", e))?,
        ),
        created_at: row
            .try_get("created_at")
            .map_err(|e| decode_error("created_at", e))?,
    })
}

fn decode_error(column: &str, err: sqlx::Error) -> LedgerStoreError {
    LedgerStoreError::Storage(format!("failed to decode column '{column}': {err}"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> LedgerStoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return LedgerStoreError::Conflict(format!(
                "inventory record already exists ({operation})"
            ));
        }
    }
    LedgerStoreError::Storage(format!("{operation}: {err}"))
}
