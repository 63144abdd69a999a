//! Tag CRUD route handlers. Mutations are admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CreateTag, Tag, UpdateTag};
use crate::state::AppState;

use super::helpers::{require_admin, require_user};

/// Create the tag router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tags", get(list).post(create))
        .route("/api/tags/{id}", axum::routing::put(update).delete(remove))
}

/// List all tags, ordered by name.
///
/// GET /api/tags
async fn list(State(state): State<AppState>, session: Session) -> AppResult<Json<Vec<Tag>>> {
    require_user(&state, &session).await?;
    let tags = Tag::list(state.db()?).await?;
    Ok(Json(tags))
}

/// Create a tag.
///
/// POST /api/tags
async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<CreateTag>,
) -> AppResult<(StatusCode, Json<Tag>)> {
    let user = require_admin(&state, &session).await?;

    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    let tag = Tag::create(state.db()?, input).await?;
    info!(tag_id = %tag.id, user_id = %user.id, "tag created");
    Ok((StatusCode::CREATED, Json(tag)))
}

/// Update a tag.
///
/// PUT /api/tags/{id}
async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTag>,
) -> AppResult<Json<Tag>> {
    require_admin(&state, &session).await?;

    let tag = Tag::update(state.db()?, id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(tag))
}

/// Delete a tag. Workshops still carrying it simply lose the label.
///
/// DELETE /api/tags/{id}
async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let user = require_admin(&state, &session).await?;

    if !Tag::delete(state.db()?, id).await? {
        return Err(AppError::NotFound);
    }

    info!(tag_id = %id, user_id = %user.id, "tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
