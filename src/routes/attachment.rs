//! Attachment routes: upload, metadata, deletion, and file download.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::file::{FileStorage, MAX_FILE_SIZE};
use crate::models::attachment::CreateAttachment;
use crate::models::{Attachment, Workshop};
use crate::state::AppState;

use super::helpers::require_user;

/// Attachment metadata plus its resolved public URL.
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    #[serde(flatten)]
    pub attachment: Attachment,
    pub url: String,
}

/// Create the attachment router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/workshops/{id}/attachments", post(upload))
        .route("/api/attachments/{id}", get(detail).delete(remove))
        .route("/files/{*path}", get(download))
}

/// Upload a file and attach it to a workshop.
///
/// POST /api/workshops/{id}/attachments (multipart, field `file`)
async fn upload(
    State(state): State<AppState>,
    session: Session,
    Path(workshop_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<AttachmentResponse>)> {
    let user = require_user(&state, &session).await?;

    let pool = state.db()?;
    Workshop::find_by_id(pool, workshop_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut file_name: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
            if bytes.len() > MAX_FILE_SIZE {
                return Err(AppError::BadRequest(format!(
                    "file too large: {} bytes (max {MAX_FILE_SIZE})",
                    bytes.len()
                )));
            }
            data = Some(bytes.to_vec());
        }
    }

    let file_name = file_name.ok_or_else(|| AppError::BadRequest("missing file field".to_string()))?;
    let data = data.ok_or_else(|| AppError::BadRequest("empty upload".to_string()))?;

    // Sniff the type from content rather than trusting the client.
    let file_type = infer::get(&data).map(|kind| kind.mime_type().to_string());

    let uri = state.files().generate_uri(&file_name);
    state.files().write(&uri, &data).await?;

    let attachment = Attachment::create(
        pool,
        CreateAttachment {
            workshop_id,
            file_name,
            file_path: uri,
            file_type,
            file_size: Some(data.len() as i64),
            uploaded_by: Some(user.id),
        },
    )
    .await?;

    info!(attachment_id = %attachment.id, workshop_id = %workshop_id, "attachment uploaded");

    let url = state.files().public_url(&attachment.file_path);
    Ok((
        StatusCode::CREATED,
        Json(AttachmentResponse { attachment, url }),
    ))
}

/// Attachment metadata with its public URL.
///
/// GET /api/attachments/{id}
async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AttachmentResponse>> {
    require_user(&state, &session).await?;

    let attachment = Attachment::find_by_id(state.db()?, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let url = state.files().public_url(&attachment.file_path);
    Ok(Json(AttachmentResponse { attachment, url }))
}

/// Delete an attachment record and its stored bytes.
///
/// DELETE /api/attachments/{id}
async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let user = require_user(&state, &session).await?;

    let pool = state.db()?;
    let attachment = Attachment::find_by_id(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let owns_upload = attachment.uploaded_by == Some(user.id);
    if !owns_upload && !user.is_admin() {
        return Err(AppError::Forbidden);
    }

    Attachment::delete(pool, id).await?;
    if let Err(e) = state.files().delete(&attachment.file_path).await {
        tracing::warn!(error = %e, path = %attachment.file_path, "failed to remove attachment blob");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Serve stored file bytes.
///
/// GET /files/{path}
async fn download(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let uri = format!("local://{path}");

    match state.files().read(&uri).await {
        Ok(data) => {
            let mime = infer::get(&data)
                .map(|kind| kind.mime_type().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            ([(header::CONTENT_TYPE, mime)], data).into_response()
        }
        Err(_) => AppError::NotFound.into_response(),
    }
}
