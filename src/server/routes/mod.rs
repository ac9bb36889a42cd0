//! REST route handlers
//!
//! One sub-module per resource:
//! - review_routes: `/api/reviews` CRUD
//! - prd_routes: `/api/prds` CRUD
//! - ai_routes: `/api/ai` model proxy

pub mod ai_routes;
pub mod prd_routes;
pub mod review_routes;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error body shared by every failing route: `{"error": <message>}`
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// Map a storage failure to a 500, logging the underlying cause. The
/// client gets a stable summary, not the io error text.
pub fn storage_error(context: &str, err: String) -> Response {
    log::error!("[api] {}: {}", context, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
}
