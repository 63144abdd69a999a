//! Health check endpoint.
//!
//! Reports whether the backing database is configured and reachable.
//! An unconfigured service is reported as degraded, not dead: the
//! process is up, but data and auth endpoints answer 503.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    configured: bool,
    postgres: bool,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let configured = state.is_configured();
    let postgres = state.postgres_healthy().await;

    let (status, status_code) = if postgres {
        ("healthy", StatusCode::OK)
    } else if !configured {
        ("unconfigured", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            configured,
            postgres,
        }),
    )
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
