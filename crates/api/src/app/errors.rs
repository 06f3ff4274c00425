use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storekeep_infra::LedgerStoreError;

pub fn ledger_error_to_response(err: LedgerStoreError) -> axum::response::Response {
    match err {
        LedgerStoreError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "inventory record not found")
        }
        LedgerStoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        LedgerStoreError::Invalid(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        LedgerStoreError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
