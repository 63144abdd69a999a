//! Tag model: shared labels attached to workshops (many-to-many).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Default display color for new tags.
pub const DEFAULT_TAG_COLOR: &str = "#003a5d";

/// Fixed tag classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "tag_category", rename_all = "snake_case")]
pub enum TagCategory {
    WorkshopType,
    StageType,
    Custom,
}

/// A tag record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub category: TagCategory,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub category: TagCategory,
    pub color: Option<String>,
}

/// Input for updating a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub category: Option<TagCategory>,
    pub color: Option<String>,
}

impl Tag {
    /// Find a tag by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch tag")?;

        Ok(tag)
    }

    /// List all tags ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
            .fetch_all(pool)
            .await
            .context("failed to list tags")?;

        Ok(tags)
    }

    /// Create a new tag.
    pub async fn create(pool: &PgPool, input: CreateTag) -> Result<Self> {
        let id = Uuid::now_v7();
        let color = input
            .color
            .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());

        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (id, name, category, color)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.category)
        .bind(&color)
        .fetch_one(pool)
        .await
        .context("failed to create tag")?;

        Ok(tag)
    }

    /// Update a tag. Absent fields keep their current value.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateTag) -> Result<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let name = input.name.unwrap_or(current.name);
        let category = input.category.unwrap_or(current.category);
        let color = input.color.unwrap_or(current.color);

        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
            SET name = $1, category = $2, color = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(category)
        .bind(&color)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to update tag")?;

        Ok(tag)
    }

    /// Delete a tag. Join rows referencing it are removed by cascade;
    /// workshops that carried it are otherwise untouched.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete tag")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_snake_case() {
        let parsed: TagCategory = serde_json::from_str("\"workshop_type\"").unwrap();
        assert_eq!(parsed, TagCategory::WorkshopType);

        let json = serde_json::to_string(&TagCategory::StageType).unwrap();
        assert_eq!(json, "\"stage_type\"");
    }

    #[test]
    fn tag_serialization() {
        let tag = Tag {
            id: Uuid::nil(),
            name: "Icebreaker".to_string(),
            category: TagCategory::Custom,
            color: DEFAULT_TAG_COLOR.to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["name"], "Icebreaker");
        assert_eq!(json["category"], "custom");
        assert_eq!(json["color"], "#003a5d");

        let parsed: Tag = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.name, "Icebreaker");
    }
}
