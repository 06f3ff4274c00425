use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use storekeep_core::ProductId;
use storekeep_ledger::{Adjustment, InventoryRecord};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{ActorContext, StoreContext};

/// How many audit entries a record lookup returns alongside the record.
const RECENT_TRANSACTION_LIMIT: i64 = 10;

pub fn router() -> Router {
    Router::new()
        .route("/bulk", post(bulk_adjust))
        .route("/:product_id", post(provision_record).get(get_record))
        .route("/:product_id/adjust", post(adjust_stock))
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(store): Extension<StoreContext>,
    Extension(actor): Extension<ActorContext>,
    Path(product_id): Path<String>,
    Json(body): Json<dto::AdjustRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };

    let adjustment = Adjustment {
        product_id,
        store_id: store.store_id(),
        delta: body.delta,
        transaction_type: body.transaction_type,
        reason: body.reason,
        notes: body.notes,
        reference: body.reference,
        unit_cost: body.unit_cost,
        supplier: body.supplier,
        batch_number: body.batch_number,
        expiry_date: body.expiry_date,
        performed_by: actor.user_id(),
        occurred_at: Utc::now(),
    };

    let applied = match services.ledger.adjust(&adjustment).await {
        Ok(a) => a,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Inventory updated successfully",
            "inventory": dto::record_to_json(&applied.record),
            "transaction": dto::transaction_to_json(&applied.transaction),
        })),
    )
        .into_response()
}

pub async fn bulk_adjust(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(store): Extension<StoreContext>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::BulkRequest>,
) -> axum::response::Response {
    if body.updates.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "updates array is required",
        );
    }

    let entries: Vec<_> = body
        .updates
        .into_iter()
        .map(dto::BulkUpdateRequest::into_entry)
        .collect();

    let results = services
        .ledger
        .adjust_many(store.store_id(), &entries, actor.user_id(), Utc::now())
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Bulk inventory update completed",
            "results": results.iter().map(dto::bulk_result_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

pub async fn provision_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(store): Extension<StoreContext>,
    Path(product_id): Path<String>,
    body: Option<Json<dto::ProvisionRequest>>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };

    let Json(body) = body.unwrap_or_default();

    let mut record = InventoryRecord::provision(product_id, store.store_id(), Utc::now());
    if let Some(reorder_point) = body.reorder_point {
        record.reorder_point = reorder_point;
    }
    if let Some(max_stock) = body.max_stock {
        record.max_stock = max_stock;
    }
    if let Some(location) = body.location {
        record.location = location;
    }

    let record = match services.ledger.create(record).await {
        Ok(r) => r,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "inventory": dto::record_to_json(&record),
        })),
    )
        .into_response()
}

pub async fn get_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(store): Extension<StoreContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };

    let record = match services.ledger.get(product_id, store.store_id()).await {
        Ok(Some(r)) => r,
        Ok(None) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                "inventory record not found",
            );
        }
        Err(e) => return errors::ledger_error_to_response(e),
    };

    let transactions = match services
        .ledger
        .recent_transactions(product_id, store.store_id(), RECENT_TRANSACTION_LIMIT)
        .await
    {
        Ok(t) => t,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "inventory": dto::record_to_json(&record),
            "recentTransactions": transactions.iter().map(dto::transaction_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}
