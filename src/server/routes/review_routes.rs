//! Code review CRUD routes

use super::{error_response, not_found, storage_error};
use crate::models::{DocumentPayload, SavedDocument};
use crate::server::ServerAppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// GET /api/reviews
pub async fn list_reviews(State(state): State<ServerAppState>) -> Response {
    match state.reviews.list() {
        Ok(reviews) => Json(reviews).into_response(),
        Err(e) => storage_error("Failed to read reviews", e),
    }
}

/// GET /api/reviews/:id
pub async fn get_review(State(state): State<ServerAppState>, Path(id): Path<String>) -> Response {
    match state.reviews.get(&id) {
        Ok(Some(review)) => Json(review).into_response(),
        Ok(None) => not_found(),
        Err(e) => storage_error("Failed to get review", e),
    }
}

/// POST /api/reviews
///
/// The body is the complete document, id included: the client owns id
/// generation and the store keeps it verbatim.
pub async fn create_review(
    State(state): State<ServerAppState>,
    Json(document): Json<SavedDocument>,
) -> Response {
    if !matches!(document.payload, DocumentPayload::CodeReview(_)) {
        return error_response(StatusCode::BAD_REQUEST, "Expected a code-review document");
    }
    match state.reviews.insert(document) {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(e) => storage_error("Failed to create review", e),
    }
}

/// PUT /api/reviews/:id
///
/// Full replacement. The path id wins over any id in the body; the stored
/// createdAt survives and modifiedAt is bumped by the store.
pub async fn update_review(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    Json(mut document): Json<SavedDocument>,
) -> Response {
    if !matches!(document.payload, DocumentPayload::CodeReview(_)) {
        return error_response(StatusCode::BAD_REQUEST, "Expected a code-review document");
    }
    document.id = id;

    match state.reviews.update(document) {
        Ok(Some(review)) => Json(review).into_response(),
        Ok(None) => not_found(),
        Err(e) => storage_error("Failed to update review", e),
    }
}

/// DELETE /api/reviews/:id
pub async fn delete_review(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> Response {
    match state.reviews.delete(&id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(),
        Err(e) => storage_error("Failed to delete review", e),
    }
}

/// GET /api/reviews/:id/export
pub async fn export_review(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> Response {
    match state.reviews.get(&id) {
        Ok(Some(review)) => {
            let DocumentPayload::CodeReview(form) = &review.payload else {
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Stored document has the wrong payload kind",
                );
            };
            let markdown = crate::export::review_markdown(form, Some(review.created_at));
            ([("content-type", "text/markdown; charset=utf-8")], markdown).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => storage_error("Failed to export review", e),
    }
}
