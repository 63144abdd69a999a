//! Profile model: user identity, credentials, and role.

use anyhow::{Context, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User role controlling access to administration endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Contributor,
}

/// Profile record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public profile shape embedded in workshop responses.
///
/// Same columns as [`Profile`] minus the password hash, which never
/// leaves the database when profiles are joined into other queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Whether this profile has administration rights.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Find a profile by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch profile by id")?;

        Ok(profile)
    }

    /// Find a profile by email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
            .context("failed to fetch profile by email")?;

        Ok(profile)
    }

    /// Create a new profile with a hashed password.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        role: UserRole,
    ) -> Result<Self> {
        let id = Uuid::now_v7();
        let password_hash = hash_password(password)?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(&password_hash)
        .bind(full_name)
        .bind(role)
        .fetch_one(pool)
        .await
        .context("failed to create profile")?;

        Ok(profile)
    }

    /// List all profiles ordered by email.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let profiles = sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY email")
            .fetch_all(pool)
            .await
            .context("failed to list profiles")?;

        Ok(profiles)
    }

    /// Change a profile's role.
    pub async fn update_role(pool: &PgPool, id: Uuid, role: UserRole) -> Result<Option<Self>> {
        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(role)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to update profile role")?;

        Ok(profile)
    }

    /// Verify a password against this profile's hash.
    pub fn verify_password(&self, password: &str) -> bool {
        if self.password_hash.is_empty() {
            return false;
        }

        let Ok(parsed_hash) = PasswordHash::new(&self.password_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_profile(role: UserRole, hash: &str) -> Profile {
        Profile {
            id: Uuid::nil(),
            email: "anna@example.org".to_string(),
            password_hash: hash.to_string(),
            full_name: Some("Anna".to_string()),
            role,
            avatar_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hashing_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));

        let profile = sample_profile(UserRole::Contributor, &hash);
        assert!(profile.verify_password("correct horse battery"));
        assert!(!profile.verify_password("wrong password"));
    }

    #[test]
    fn empty_hash_never_verifies() {
        let profile = sample_profile(UserRole::Contributor, "");
        assert!(!profile.verify_password(""));
        assert!(!profile.verify_password("anything"));
    }

    #[test]
    fn role_checks() {
        let hash = hash_password("pw").unwrap();
        assert!(sample_profile(UserRole::Admin, &hash).is_admin());
        assert!(!sample_profile(UserRole::Contributor, &hash).is_admin());
    }

    #[test]
    fn serialization_skips_password_hash() {
        let profile = sample_profile(UserRole::Admin, "$argon2id$secret");
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn role_round_trips_snake_case() {
        let role: UserRole = serde_json::from_str("\"contributor\"").unwrap();
        assert_eq!(role, UserRole::Contributor);
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
    }
}
