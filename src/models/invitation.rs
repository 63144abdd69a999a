//! Invitation model: pending-access records for new contributors.
//!
//! Tokens are random, stored hashed, and expire after a fixed window.
//! There is no renewal: an expired invitation is re-issued, not extended.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::UserRole;

/// Invitation validity period (7 days).
const INVITATION_VALIDITY_DAYS: i64 = 7;

/// An invitation record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub invited_by: Option<Uuid>,
    #[serde(skip_serializing, default)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Create a new invitation.
    ///
    /// Returns (record, plain_token); the plain token is shown once and
    /// only its hash is stored.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        invited_by: Option<Uuid>,
    ) -> Result<(Self, String)> {
        let plain_token = generate_token();
        let token_hash = hash_token(&plain_token);

        let id = Uuid::now_v7();
        let expires_at = Utc::now() + Duration::days(INVITATION_VALIDITY_DAYS);

        let record = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (id, email, role, invited_by, token_hash, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(UserRole::Contributor)
        .bind(invited_by)
        .bind(&token_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await
        .context("failed to create invitation")?;

        Ok((record, plain_token))
    }

    /// Find a valid invitation by its plain token.
    ///
    /// Returns None if the token is unknown, expired, or already accepted.
    pub async fn find_valid(pool: &PgPool, plain_token: &str) -> Result<Option<Self>> {
        let token_hash = hash_token(plain_token);

        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT * FROM invitations
            WHERE token_hash = $1
              AND expires_at > NOW()
              AND accepted_at IS NULL
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(pool)
        .await
        .context("failed to find invitation")?;

        Ok(invitation)
    }

    /// Mark an invitation as accepted.
    pub async fn mark_accepted(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE invitations SET accepted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to mark invitation accepted")?;

        Ok(())
    }

    /// List all invitations, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let invitations =
            sqlx::query_as::<_, Invitation>("SELECT * FROM invitations ORDER BY created_at DESC")
                .fetch_all(pool)
                .await
                .context("failed to list invitations")?;

        Ok(invitations)
    }

    /// Delete (revoke) an invitation.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete invitation")?;

        Ok(result.rows_affected() > 0)
    }
}

/// Generate a secure random token.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Hash a token for storage.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn token_hash_is_stable_and_distinct() {
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), token);
        assert_eq!(hash_token(&token).len(), 64);
    }

    #[test]
    fn serialization_skips_token_hash() {
        let invitation = Invitation {
            id: Uuid::nil(),
            email: "invite@example.org".to_string(),
            role: UserRole::Contributor,
            invited_by: None,
            token_hash: "deadbeef".to_string(),
            expires_at: Utc::now(),
            accepted_at: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&invitation).unwrap();
        assert!(json.get("token_hash").is_none());
        assert_eq!(json["role"], "contributor");
    }
}
