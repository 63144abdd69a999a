//! Integration model: per-user connections to external content sources.
//!
//! Only the connection records live here; import/sync against the
//! external services is handled elsewhere.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// External source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "integration_kind", rename_all = "snake_case")]
pub enum IntegrationKind {
    Notion,
    Gdrive,
}

/// An integration record. Tokens are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Integration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: IntegrationKind,
    #[serde(skip_serializing, default)]
    pub access_token: Option<String>,
    #[serde(skip_serializing, default)]
    pub refresh_token: Option<String>,
    pub config: serde_json::Value,
    pub last_sync: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Integration {
    /// List a user's integrations.
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>> {
        let integrations = sqlx::query_as::<_, Integration>(
            "SELECT * FROM integrations WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("failed to list integrations")?;

        Ok(integrations)
    }

    /// Delete an integration owned by the given user.
    pub async fn delete_for_user(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM integrations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await
            .context("failed to delete integration")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn serialization_skips_tokens() {
        let integration = Integration {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            kind: IntegrationKind::Notion,
            access_token: Some("secret".to_string()),
            refresh_token: Some("secret".to_string()),
            config: serde_json::json!({ "workspace": "team" }),
            last_sync: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&integration).unwrap();
        assert!(json.get("access_token").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["kind"], "notion");
    }
}
