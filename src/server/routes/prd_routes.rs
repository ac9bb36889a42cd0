//! PRD CRUD routes

use super::{error_response, not_found, storage_error};
use crate::models::{DocumentPayload, SavedDocument};
use crate::server::ServerAppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// GET /api/prds
pub async fn list_prds(State(state): State<ServerAppState>) -> Response {
    match state.prds.list() {
        Ok(prds) => Json(prds).into_response(),
        Err(e) => storage_error("Failed to read PRDs", e),
    }
}

/// GET /api/prds/:id
pub async fn get_prd(State(state): State<ServerAppState>, Path(id): Path<String>) -> Response {
    match state.prds.get(&id) {
        Ok(Some(prd)) => Json(prd).into_response(),
        Ok(None) => not_found(),
        Err(e) => storage_error("Failed to get PRD", e),
    }
}

/// POST /api/prds
pub async fn create_prd(
    State(state): State<ServerAppState>,
    Json(document): Json<SavedDocument>,
) -> Response {
    if !matches!(document.payload, DocumentPayload::Prd(_)) {
        return error_response(StatusCode::BAD_REQUEST, "Expected a prd document");
    }
    match state.prds.insert(document) {
        Ok(prd) => (StatusCode::CREATED, Json(prd)).into_response(),
        Err(e) => storage_error("Failed to create PRD", e),
    }
}

/// PUT /api/prds/:id
pub async fn update_prd(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    Json(mut document): Json<SavedDocument>,
) -> Response {
    if !matches!(document.payload, DocumentPayload::Prd(_)) {
        return error_response(StatusCode::BAD_REQUEST, "Expected a prd document");
    }
    document.id = id;

    match state.prds.update(document) {
        Ok(Some(prd)) => Json(prd).into_response(),
        Ok(None) => not_found(),
        Err(e) => storage_error("Failed to update PRD", e),
    }
}

/// DELETE /api/prds/:id
pub async fn delete_prd(State(state): State<ServerAppState>, Path(id): Path<String>) -> Response {
    match state.prds.delete(&id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(),
        Err(e) => storage_error("Failed to delete PRD", e),
    }
}

/// GET /api/prds/:id/export
pub async fn export_prd(State(state): State<ServerAppState>, Path(id): Path<String>) -> Response {
    match state.prds.get(&id) {
        Ok(Some(prd)) => {
            let DocumentPayload::Prd(form) = &prd.payload else {
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Stored document has the wrong payload kind",
                );
            };
            let markdown =
                crate::export::prd_markdown(form, Some(prd.created_at), Some(prd.modified_at));
            ([("content-type", "text/markdown; charset=utf-8")], markdown).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => storage_error("Failed to export PRD", e),
    }
}
