//! User administration routes: profile listing, role changes, and
//! invitations. All admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::profile::UserRole;
use crate::models::{Invitation, Profile};
use crate::state::AppState;

use super::helpers::require_admin;

/// Role change request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Invitation creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
}

/// Invitation creation response; the token is shown exactly once.
#[derive(Debug, Serialize)]
pub struct CreatedInvitationResponse {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub token: String,
}

/// Create the user administration router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}/role", axum::routing::put(update_role))
        .route("/api/invitations", get(list_invitations).post(create_invitation))
        .route("/api/invitations/{id}", axum::routing::delete(revoke_invitation))
}

/// List all profiles.
///
/// GET /api/users
async fn list_users(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<Profile>>> {
    require_admin(&state, &session).await?;
    let profiles = Profile::list(state.db()?).await?;
    Ok(Json(profiles))
}

/// Change a user's role.
///
/// PUT /api/users/{id}/role
async fn update_role(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> AppResult<Json<Profile>> {
    let admin = require_admin(&state, &session).await?;

    if admin.id == id && request.role != UserRole::Admin {
        return Err(AppError::BadRequest(
            "cannot remove your own admin role".to_string(),
        ));
    }

    let profile = Profile::update_role(state.db()?, id, request.role)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(user_id = %id, role = ?request.role, "role updated");
    Ok(Json(profile))
}

/// List invitations, newest first.
///
/// GET /api/invitations
async fn list_invitations(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<Invitation>>> {
    require_admin(&state, &session).await?;
    let invitations = Invitation::list(state.db()?).await?;
    Ok(Json(invitations))
}

/// Create an invitation for a new contributor.
///
/// POST /api/invitations
async fn create_invitation(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateInvitationRequest>,
) -> AppResult<(StatusCode, Json<CreatedInvitationResponse>)> {
    let admin = require_admin(&state, &session).await?;

    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("a valid email is required".to_string()));
    }

    let (invitation, token) = Invitation::create(state.db()?, &email, Some(admin.id)).await?;

    info!(invitation_id = %invitation.id, "invitation created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedInvitationResponse { invitation, token }),
    ))
}

/// Revoke a pending invitation.
///
/// DELETE /api/invitations/{id}
async fn revoke_invitation(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&state, &session).await?;

    if !Invitation::delete(state.db()?, id).await? {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
