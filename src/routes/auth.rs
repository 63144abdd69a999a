//! Authentication routes: signup, login, logout, session lookup.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::profile::UserRole;
use crate::models::{Invitation, Profile};
use crate::session::SESSION_USER_ID;
use crate::state::AppState;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    /// Optional invitation token; consumed on success.
    pub invitation_token: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session lookup response.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub profile: Option<Profile>,
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session_lookup))
}

/// Register a new account and sign it in.
///
/// POST /api/auth/signup
async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SignupRequest>,
) -> AppResult<Json<Profile>> {
    let pool = state.db()?;

    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("a valid email is required".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if Profile::find_by_email(pool, &email).await?.is_some() {
        return Err(AppError::BadRequest("email is already registered".to_string()));
    }

    // An invitation fixes the role; without one, new accounts are
    // contributors.
    let invitation = match &request.invitation_token {
        Some(token) => Some(
            Invitation::find_valid(pool, token)
                .await?
                .ok_or_else(|| AppError::BadRequest("invalid or expired invitation".to_string()))?,
        ),
        None => None,
    };
    let role = invitation
        .as_ref()
        .map_or(UserRole::Contributor, |inv| inv.role);

    let profile = Profile::create(
        pool,
        &email,
        &request.password,
        request.full_name.as_deref(),
        role,
    )
    .await?;

    if let Some(invitation) = invitation {
        Invitation::mark_accepted(pool, invitation.id).await?;
    }

    session
        .insert(SESSION_USER_ID, profile.id)
        .await
        .map_err(anyhow::Error::from)?;

    info!(user_id = %profile.id, "account created");
    Ok(Json(profile))
}

/// Sign in with email and password.
///
/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<Profile>> {
    let pool = state.db()?;
    let email = request.email.trim().to_lowercase();

    // One failure path for unknown email and bad password; no oracle.
    let profile = Profile::find_by_email(pool, &email)
        .await?
        .filter(|p| p.verify_password(&request.password))
        .ok_or(AppError::Unauthorized)?;

    session
        .insert(SESSION_USER_ID, profile.id)
        .await
        .map_err(anyhow::Error::from)?;

    info!(user_id = %profile.id, "user logged in");
    Ok(Json(profile))
}

/// Sign out, destroying the session.
///
/// POST /api/auth/logout
async fn logout(session: Session) -> AppResult<Json<SessionResponse>> {
    session.delete().await.map_err(anyhow::Error::from)?;

    Ok(Json(SessionResponse {
        authenticated: false,
        profile: None,
    }))
}

/// Current session and profile.
///
/// GET /api/auth/session
async fn session_lookup(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<SessionResponse>> {
    let profile = super::helpers::current_user(&state, &session).await?;

    Ok(Json(SessionResponse {
        authenticated: profile.is_some(),
        profile,
    }))
}
