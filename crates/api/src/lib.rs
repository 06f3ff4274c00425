//! `storekeep-api` — HTTP surface for the stock ledger.

pub mod app;
pub mod context;
pub mod middleware;
