//! Attachment model: files stored alongside a workshop.
//!
//! Attachment rows hold metadata only; the bytes live in file storage
//! under the `file_path` URI. Rows are removed by cascade when their
//! owning workshop is deleted.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// An attachment record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub workshop_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording an uploaded attachment.
#[derive(Debug, Clone)]
pub struct CreateAttachment {
    pub workshop_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_by: Option<Uuid>,
}

impl Attachment {
    /// Find an attachment by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let attachment = sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch attachment")?;

        Ok(attachment)
    }

    /// List attachments for a workshop, oldest first.
    pub async fn list_by_workshop(pool: &PgPool, workshop_id: Uuid) -> Result<Vec<Self>> {
        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE workshop_id = $1 ORDER BY created_at",
        )
        .bind(workshop_id)
        .fetch_all(pool)
        .await
        .context("failed to list attachments")?;

        Ok(attachments)
    }

    /// Record an uploaded attachment.
    pub async fn create(pool: &PgPool, input: CreateAttachment) -> Result<Self> {
        let id = Uuid::now_v7();

        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (id, workshop_id, file_name, file_path, file_type, file_size, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.workshop_id)
        .bind(&input.file_name)
        .bind(&input.file_path)
        .bind(&input.file_type)
        .bind(input.file_size)
        .bind(input.uploaded_by)
        .fetch_one(pool)
        .await
        .context("failed to create attachment")?;

        Ok(attachment)
    }

    /// Delete an attachment record.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete attachment")?;

        Ok(result.rows_affected() > 0)
    }
}
