//! Shared handler helpers: session-to-profile resolution and
//! authorization checks.

use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Profile;
use crate::session::SESSION_USER_ID;
use crate::state::AppState;

/// Load the profile for the current session, if any.
///
/// A session pointing at a deleted profile counts as signed out and is
/// cleared.
pub async fn current_user(state: &AppState, session: &Session) -> AppResult<Option<Profile>> {
    let user_id: Option<Uuid> = session
        .get(SESSION_USER_ID)
        .await
        .map_err(anyhow::Error::from)?;

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let profile = Profile::find_by_id(state.db()?, user_id).await?;
    if profile.is_none() {
        session.delete().await.map_err(anyhow::Error::from)?;
    }

    Ok(profile)
}

/// Require an authenticated profile; 401 otherwise.
pub async fn require_user(state: &AppState, session: &Session) -> AppResult<Profile> {
    current_user(state, session)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Require an authenticated admin; 401 when signed out, 403 otherwise.
pub async fn require_admin(state: &AppState, session: &Session) -> AppResult<Profile> {
    let profile = require_user(state, session).await?;
    if !profile.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(profile)
}

/// Parse a comma-separated uuid list query parameter.
pub fn parse_uuid_list(raw: &str) -> Result<Vec<Uuid>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| AppError::BadRequest(format!("invalid uuid in tag_ids: {s}")))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn uuid_list_parses_and_trims() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let parsed = parse_uuid_list(&format!(" {a} , {b} ,")).unwrap();
        assert_eq!(parsed, vec![a, b]);
    }

    #[test]
    fn uuid_list_rejects_garbage() {
        assert!(parse_uuid_list("not-a-uuid").is_err());
        assert!(parse_uuid_list("").unwrap().is_empty());
    }
}
