//! Workshop model and CRUD operations.
//!
//! Workshops are the central content record: a teachable activity with
//! rich-text content, materials, objectives, and a many-to-many tag
//! relationship through `workshop_tags`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Provenance of a workshop record.
///
/// `Manual` entries are authored in the application; the other variants
/// mark records imported from a connected external source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "workshop_source", rename_all = "snake_case")]
pub enum WorkshopSource {
    Manual,
    Notion,
    Gdrive,
}

/// A workshop record as stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workshop {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub duration_minutes: Option<i32>,
    pub participants_min: Option<i32>,
    pub participants_max: Option<i32>,
    pub materials: Vec<String>,
    pub objectives: Vec<String>,
    pub creator_id: Option<Uuid>,
    pub source: WorkshopSource,
    pub source_id: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or fully updating a workshop.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkshopInput {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub duration_minutes: Option<i32>,
    pub participants_min: Option<i32>,
    pub participants_max: Option<i32>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

impl WorkshopInput {
    /// Validate the input. Returns a message suitable for a 400 body.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if let Some(duration) = self.duration_minutes {
            if duration < 0 {
                return Err("duration_minutes must not be negative".to_string());
            }
        }
        if let (Some(min), Some(max)) = (self.participants_min, self.participants_max) {
            if min > max {
                return Err("participants_min must not exceed participants_max".to_string());
            }
        }
        Ok(())
    }
}

impl Workshop {
    /// Find a workshop row by ID (no relations).
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let workshop = sqlx::query_as::<_, Workshop>(&format!(
            "SELECT {COLUMNS} FROM workshops WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch workshop")?;

        Ok(workshop)
    }

    /// Create a workshop with the caller as creator, then attach tags.
    ///
    /// The tag join rows are written after the workshop insert; a join
    /// failure fails the whole operation but does not roll back the
    /// already-created workshop row.
    pub async fn create(pool: &PgPool, creator_id: Uuid, input: &WorkshopInput) -> Result<Self> {
        let id = Uuid::now_v7();

        let workshop = sqlx::query_as::<_, Workshop>(&format!(
            r#"
            INSERT INTO workshops
                (id, title, description, content, duration_minutes,
                 participants_min, participants_max, materials, objectives,
                 creator_id, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'manual')
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.content)
        .bind(input.duration_minutes)
        .bind(input.participants_min)
        .bind(input.participants_max)
        .bind(&input.materials)
        .bind(&input.objectives)
        .bind(creator_id)
        .fetch_one(pool)
        .await
        .context("failed to create workshop")?;

        if !input.tag_ids.is_empty() {
            for tag_id in &input.tag_ids {
                sqlx::query("INSERT INTO workshop_tags (workshop_id, tag_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(tag_id)
                    .execute(pool)
                    .await
                    .context("failed to attach tag to workshop")?;
            }
        }

        Ok(workshop)
    }

    /// Update a workshop and replace its tag set.
    ///
    /// The row update, the removal of existing join rows, and the
    /// re-insert of the submitted tag list run in one transaction, so a
    /// failure part-way never leaves a workshop stripped of its tags.
    /// An empty tag list is valid and yields no join rows.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &WorkshopInput,
    ) -> Result<Option<Self>> {
        let mut tx = pool.begin().await.context("failed to start transaction")?;

        let workshop = sqlx::query_as::<_, Workshop>(&format!(
            r#"
            UPDATE workshops
            SET title = $1, description = $2, content = $3,
                duration_minutes = $4, participants_min = $5,
                participants_max = $6, materials = $7, objectives = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.content)
        .bind(input.duration_minutes)
        .bind(input.participants_min)
        .bind(input.participants_max)
        .bind(&input.materials)
        .bind(&input.objectives)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("failed to update workshop")?;

        let Some(workshop) = workshop else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM workshop_tags WHERE workshop_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("failed to clear workshop tags")?;

        for tag_id in &input.tag_ids {
            sqlx::query("INSERT INTO workshop_tags (workshop_id, tag_id) VALUES ($1, $2)")
                .bind(id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("failed to attach tag to workshop")?;
        }

        tx.commit().await.context("failed to commit transaction")?;

        Ok(Some(workshop))
    }

    /// Delete a workshop. Join rows and attachment records are removed
    /// by referential cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workshops WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete workshop")?;

        Ok(result.rows_affected() > 0)
    }

    /// Current tag ids attached to a workshop, in attachment order.
    pub async fn tag_ids(pool: &PgPool, id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT tag_id FROM workshop_tags WHERE workshop_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await
        .context("failed to fetch workshop tag ids")?;

        Ok(ids)
    }
}

/// Column list shared by workshop queries; excludes the search vector.
pub const COLUMNS: &str = "id, title, description, content, duration_minutes, \
    participants_min, participants_max, materials, objectives, creator_id, \
    source, source_id, source_url, created_at, updated_at";

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn minimal_input(title: &str) -> WorkshopInput {
        WorkshopInput {
            title: title.to_string(),
            description: None,
            content: None,
            duration_minutes: None,
            participants_min: None,
            participants_max: None,
            materials: vec![],
            objectives: vec![],
            tag_ids: vec![],
        }
    }

    #[test]
    fn validation_requires_title() {
        assert!(minimal_input("Fresque du climat").validate().is_ok());
        assert!(minimal_input("").validate().is_err());
        assert!(minimal_input("   ").validate().is_err());
    }

    #[test]
    fn validation_checks_participant_bounds() {
        let mut input = minimal_input("Atelier");
        input.participants_min = Some(10);
        input.participants_max = Some(5);
        assert!(input.validate().is_err());

        input.participants_max = Some(10);
        assert!(input.validate().is_ok());

        // One-sided bounds are fine.
        input.participants_max = None;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn validation_rejects_negative_duration() {
        let mut input = minimal_input("Atelier");
        input.duration_minutes = Some(-5);
        assert!(input.validate().is_err());
    }

    #[test]
    fn input_defaults_lists_to_empty() {
        let input: WorkshopInput =
            serde_json::from_str(r#"{ "title": "Atelier" }"#).unwrap();
        assert!(input.materials.is_empty());
        assert!(input.objectives.is_empty());
        assert!(input.tag_ids.is_empty());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn source_round_trips_snake_case() {
        let parsed: WorkshopSource = serde_json::from_str("\"gdrive\"").unwrap();
        assert_eq!(parsed, WorkshopSource::Gdrive);
        assert_eq!(
            serde_json::to_string(&WorkshopSource::Manual).unwrap(),
            "\"manual\""
        );
    }
}
