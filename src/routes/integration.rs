//! Integration routes: per-user external source connections.
//!
//! Only the connection records are managed here; import/sync against
//! the external services is not part of this server.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Integration;
use crate::state::AppState;

use super::helpers::require_user;

/// Create the integration router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/integrations", get(list))
        .route("/api/integrations/{id}", axum::routing::delete(remove))
}

/// List the caller's integrations. Tokens are never serialized.
///
/// GET /api/integrations
async fn list(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<Integration>>> {
    let user = require_user(&state, &session).await?;
    let integrations = Integration::list_by_user(state.db()?, user.id).await?;
    Ok(Json(integrations))
}

/// Disconnect one of the caller's integrations.
///
/// DELETE /api/integrations/{id}
async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let user = require_user(&state, &session).await?;

    if !Integration::delete_for_user(state.db()?, id, user.id).await? {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
