//! Workshop CRUD route handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::file::FileStorage;
use crate::models::{Attachment, Workshop, WorkshopInput};
use crate::state::AppState;
use crate::workshops::{get_workshop, list_workshops, WorkshopFilter, WorkshopView};

use super::helpers::{parse_uuid_list, require_user};

/// Query parameters for listing workshops.
#[derive(Debug, Default, Deserialize)]
pub struct ListWorkshopsQuery {
    pub search: Option<String>,
    /// Comma-separated tag ids; any match qualifies.
    pub tag_ids: Option<String>,
    pub creator_id: Option<Uuid>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub duration_min: Option<i32>,
    pub duration_max: Option<i32>,
    pub participants_min: Option<i32>,
    pub participants_max: Option<i32>,
}

impl ListWorkshopsQuery {
    fn into_filter(self) -> Result<WorkshopFilter, AppError> {
        let tag_ids = match self.tag_ids.as_deref() {
            Some(raw) => parse_uuid_list(raw)?,
            None => Vec::new(),
        };

        Ok(WorkshopFilter {
            search: self.search,
            tag_ids,
            creator_id: self.creator_id,
            date_from: self.date_from,
            date_to: self.date_to,
            duration_min: self.duration_min,
            duration_max: self.duration_max,
            participants_min: self.participants_min,
            participants_max: self.participants_max,
        })
    }
}

/// Create the workshop router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/workshops", get(list).post(create))
        .route(
            "/api/workshops/{id}",
            get(detail).put(update).delete(remove),
        )
}

/// List workshops matching the query filters, newest first.
///
/// GET /api/workshops
async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListWorkshopsQuery>,
) -> AppResult<Json<Vec<WorkshopView>>> {
    require_user(&state, &session).await?;

    let filter = params.into_filter()?;
    let workshops = list_workshops(state.db()?, state.search()?, &filter).await?;
    Ok(Json(workshops))
}

/// Fetch one workshop with creator, tags, and attachments.
///
/// GET /api/workshops/{id}
async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkshopView>> {
    require_user(&state, &session).await?;

    let workshop = get_workshop(state.db()?, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(workshop))
}

/// Create a workshop with the caller as creator.
///
/// POST /api/workshops
async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<WorkshopInput>,
) -> AppResult<(StatusCode, Json<WorkshopView>)> {
    let user = require_user(&state, &session).await?;
    input.validate().map_err(AppError::BadRequest)?;

    let pool = state.db()?;
    let created = Workshop::create(pool, user.id, &input).await?;

    info!(workshop_id = %created.id, user_id = %user.id, "workshop created");

    let view = get_workshop(pool, created.id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("created workshop vanished")))?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Update a workshop and replace its tag set.
///
/// PUT /api/workshops/{id}
async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<WorkshopInput>,
) -> AppResult<Json<WorkshopView>> {
    let user = require_user(&state, &session).await?;
    input.validate().map_err(AppError::BadRequest)?;

    let pool = state.db()?;
    let existing = Workshop::find_by_id(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if existing.creator_id != Some(user.id) && !user.is_admin() {
        return Err(AppError::Forbidden);
    }

    Workshop::update(pool, id, &input)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(workshop_id = %id, user_id = %user.id, "workshop updated");

    let view = get_workshop(pool, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(view))
}

/// Delete a workshop. Tag joins and attachments cascade in the
/// database; attachment bytes are removed from storage best-effort.
///
/// DELETE /api/workshops/{id}
async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let user = require_user(&state, &session).await?;

    let pool = state.db()?;
    let existing = Workshop::find_by_id(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if existing.creator_id != Some(user.id) && !user.is_admin() {
        return Err(AppError::Forbidden);
    }

    let attachments = Attachment::list_by_workshop(pool, id).await?;

    if !Workshop::delete(pool, id).await? {
        return Err(AppError::NotFound);
    }

    // Blob cleanup after the row delete; a failure here leaves an
    // orphaned file, not a dangling record.
    for attachment in attachments {
        if let Err(e) = state.files().delete(&attachment.file_path).await {
            tracing::warn!(error = %e, path = %attachment.file_path, "failed to remove attachment blob");
        }
    }

    info!(workshop_id = %id, user_id = %user.id, "workshop deleted");
    Ok(StatusCode::NO_CONTENT)
}
