//! `storekeep-infra` — persistence boundary for the stock ledger.
//!
//! The [`ledger_store::LedgerStore`] trait is the only seam between the domain
//! and storage. Two implementations are provided: an in-memory store for tests
//! and development, and a Postgres store for production.

pub mod ledger_store;

pub use ledger_store::{InMemoryLedgerStore, LedgerStore, LedgerStoreError, PostgresLedgerStore};
