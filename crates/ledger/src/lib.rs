//! `storekeep-ledger` — the stock ledger domain.
//!
//! An inventory record holds the on-hand quantity for a (product, store) pair.
//! The only way a record mutates after provisioning is through an [`Adjustment`]:
//! a signed delta paired with a reason and an actor, which produces the updated
//! record together with an immutable [`InventoryTransaction`] audit entry.

pub mod adjust;
pub mod record;
pub mod transaction;

pub use adjust::{Adjustment, AppliedAdjustment, BulkEntry, BulkEntryResult, BulkOutcome};
pub use record::{InventoryRecord, StockLocation};
pub use transaction::{InventoryTransaction, SupplierRef, TransactionType};
