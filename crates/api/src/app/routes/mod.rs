use axum::{Router, routing::get};

pub mod inventory;
pub mod system;

/// Router for all authenticated (store-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/inventory", inventory::router())
}
