use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{ProductId, StoreId, TransactionId, UserId};

/// Kind of stock movement recorded in the audit trail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    In,
    Out,
    Adjustment,
    Transfer,
    Return,
    Damage,
    Expiry,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
            TransactionType::Adjustment => "ADJUSTMENT",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Return => "RETURN",
            TransactionType::Damage => "DAMAGE",
            TransactionType::Expiry => "EXPIRY",
        }
    }
}

impl core::str::FromStr for TransactionType {
    type Err = storekeep_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(TransactionType::In),
            "OUT" => Ok(TransactionType::Out),
            "ADJUSTMENT" => Ok(TransactionType::Adjustment),
            "TRANSFER" => Ok(TransactionType::Transfer),
            "RETURN" => Ok(TransactionType::Return),
            "DAMAGE" => Ok(TransactionType::Damage),
            "EXPIRY" => Ok(TransactionType::Expiry),
            other => Err(storekeep_core::DomainError::validation(format!(
                "unknown transaction type: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplier attribution on inbound stock, when known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRef {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// One immutable audit-trail entry.
///
/// Appended exactly once per successful adjustment, in the same unit of work as
/// the record update. Never mutated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: TransactionId,
    pub product_id: ProductId,
    pub store_id: StoreId,

    pub transaction_type: TransactionType,

    /// Absolute magnitude of the change (`|delta|`).
    pub quantity: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,

    pub reason: String,
    pub notes: Option<String>,
    pub reference: Option<String>,
    pub reference_id: Option<TransactionId>,

    /// Minor currency units (cents), when cost is known.
    pub unit_cost: Option<i64>,
    pub total_cost: Option<i64>,

    pub supplier: Option<SupplierRef>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,

    pub performed_by: UserId,
    pub created_at: DateTime<Utc>,
}
