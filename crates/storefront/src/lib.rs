//! MenuDigital storefront library.
//!
//! Serves each restaurant's public menu at `/menu/{slug}`, keeps a cart per
//! tenant in the shopper's session, and turns a checkout into a WhatsApp
//! order link. The binary in `main.rs` wires the Supabase catalog and the
//! `PostgreSQL` session store around [`router`]; tests use the same router
//! with in-memory stand-ins.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod error;
pub mod htmx;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod supabase;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router, without the session layer.
///
/// Handlers extract `tower_sessions::Session`, so callers must add a
/// `SessionManagerLayer` on top.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::csp_nonce_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
