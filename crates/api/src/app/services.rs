use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use storekeep_infra::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore};

/// Service container shared by all request handlers.
pub struct AppServices {
    pub ledger: Arc<dyn LedgerStore>,
}

/// Build services from the environment.
///
/// With `DATABASE_URL` set, the ledger runs against Postgres; otherwise an
/// in-memory store is used (dev/tests).
pub async fn build_services() -> AppServices {
    let ledger: Arc<dyn LedgerStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => match PgPoolOptions::new().max_connections(5).connect_lazy(&url) {
            Ok(pool) => {
                tracing::info!("ledger store: postgres");
                Arc::new(PostgresLedgerStore::new(pool))
            }
            Err(e) => {
                tracing::warn!("invalid DATABASE_URL ({e}); falling back to in-memory store");
                Arc::new(InMemoryLedgerStore::new())
            }
        },
        Err(_) => {
            tracing::info!("ledger store: in-memory (DATABASE_URL not set)");
            Arc::new(InMemoryLedgerStore::new())
        }
    };

    AppServices { ledger }
}
