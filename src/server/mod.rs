//! HTTP server for the document API
//!
//! Exposes the document collections and the AI proxy over REST for the
//! browser frontend.

pub mod routes;
pub mod state;

pub use state::ServerAppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router. Split out from [`run_server`] so tests
/// can drive it without binding a socket.
pub fn build_router(state: ServerAppState) -> Router {
    Router::new()
        .route(
            "/api/reviews",
            get(routes::review_routes::list_reviews).post(routes::review_routes::create_review),
        )
        .route(
            "/api/reviews/:id",
            get(routes::review_routes::get_review)
                .put(routes::review_routes::update_review)
                .delete(routes::review_routes::delete_review),
        )
        .route(
            "/api/reviews/:id/export",
            get(routes::review_routes::export_review),
        )
        .route(
            "/api/prds",
            get(routes::prd_routes::list_prds).post(routes::prd_routes::create_prd),
        )
        .route(
            "/api/prds/:id",
            get(routes::prd_routes::get_prd)
                .put(routes::prd_routes::update_prd)
                .delete(routes::prd_routes::delete_prd),
        )
        .route("/api/prds/:id/export", get(routes::prd_routes::export_prd))
        .route("/api/ai", axum::routing::post(routes::ai_routes::proxy_ai))
        .route("/api/health", get(health_handler))
        .with_state(state)
}

/// Run the HTTP server until interrupted
pub async fn run_server(
    port: u16,
    bind: &str,
    state: ServerAppState,
    cors_origins: Option<Vec<String>>,
) -> Result<(), String> {
    // CORS must be the outermost layer so preflight OPTIONS requests are
    // answered before anything else. Explicit headers instead of Any to
    // avoid browser warnings when credentials are in play.
    let cors = match &cors_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods(Any)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]),
    };

    let app = build_router(state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install shutdown handler: {}", e);
        return;
    }
    log::info!("Shutdown signal received, stopping server...");
}

/// Health check endpoint
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}
