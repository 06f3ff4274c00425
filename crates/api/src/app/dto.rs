use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use storekeep_core::ProductId;
use storekeep_ledger::{
    BulkEntry, BulkEntryResult, BulkOutcome, InventoryRecord, InventoryTransaction, StockLocation,
    SupplierRef, TransactionType,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    /// Signed change: positive = stock in, negative = stock out.
    pub delta: i64,
    pub reason: String,
    #[serde(default = "default_transaction_type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    /// Minor currency units (cents).
    #[serde(default)]
    pub unit_cost: Option<i64>,
    #[serde(default)]
    pub supplier: Option<SupplierRef>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

fn default_transaction_type() -> TransactionType {
    TransactionType::Adjustment
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest {
    pub product_id: ProductId,
    pub delta: i64,
    pub reason: String,
    #[serde(default = "default_transaction_type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BulkUpdateRequest {
    pub fn into_entry(self) -> BulkEntry {
        BulkEntry {
            product_id: self.product_id,
            delta: self.delta,
            reason: self.reason,
            transaction_type: self.transaction_type,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub updates: Vec<BulkUpdateRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    #[serde(default)]
    pub reorder_point: Option<i64>,
    #[serde(default)]
    pub max_stock: Option<i64>,
    #[serde(default)]
    pub location: Option<StockLocation>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn record_to_json(record: &InventoryRecord) -> serde_json::Value {
    json!({
        "product": record.product_id.to_string(),
        "store": record.store_id.to_string(),
        "quantity": record.quantity,
        "reservedQuantity": record.reserved_quantity,
        "availableQuantity": record.available_quantity,
        "reorderPoint": record.reorder_point,
        "maxStock": record.max_stock,
        "location": {
            "aisle": record.location.aisle,
            "shelf": record.location.shelf,
            "bin": record.location.bin,
        },
        "lastRestocked": record.last_restocked,
        "lastUpdated": record.last_updated,
    })
}

pub fn transaction_to_json(transaction: &InventoryTransaction) -> serde_json::Value {
    json!({
        "id": transaction.id.to_string(),
        "product": transaction.product_id.to_string(),
        "store": transaction.store_id.to_string(),
        "transactionType": transaction.transaction_type.as_str(),
        "quantity": transaction.quantity,
        "previousQuantity": transaction.previous_quantity,
        "newQuantity": transaction.new_quantity,
        "reason": transaction.reason,
        "notes": transaction.notes,
        "reference": transaction.reference,
        "unitCost": transaction.unit_cost,
        "totalCost": transaction.total_cost,
        "supplier": transaction.supplier,
        "batchNumber": transaction.batch_number,
        "expiryDate": transaction.expiry_date,
        "performedBy": transaction.performed_by.to_string(),
        "createdAt": transaction.created_at,
    })
}

pub fn bulk_result_to_json(result: &BulkEntryResult) -> serde_json::Value {
    match &result.outcome {
        BulkOutcome::Applied {
            previous_quantity,
            new_quantity,
            transaction_id,
        } => json!({
            "productId": result.product_id.to_string(),
            "success": true,
            "previousQuantity": previous_quantity,
            "newQuantity": new_quantity,
            "transaction": transaction_id.to_string(),
        }),
        BulkOutcome::Failed { message } => json!({
            "productId": result.product_id.to_string(),
            "success": false,
            "message": message,
        }),
    }
}
