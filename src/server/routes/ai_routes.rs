//! AI proxy route
//!
//! The frontend never talks to the model API directly: the credential
//! stays server-side and the upstream response body is forwarded verbatim
//! so the caller can extract the first content block itself.

use super::error_response;
use crate::server::ServerAppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    pub prompt: String,
    pub system_prompt: String,
}

/// POST /api/ai
pub async fn proxy_ai(
    State(state): State<ServerAppState>,
    Json(request): Json<AiRequest>,
) -> Response {
    match state
        .ai
        .raw_complete(&request.prompt, &request.system_prompt)
        .await
    {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, e.to_string())
        }
    }
}
