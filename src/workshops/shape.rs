//! Result shaping: nested relation payloads to flat view models.
//!
//! List and detail queries return each workshop row with its relations
//! aggregated as JSON: `tags` is an array of `{"tag": {...}}` join
//! wrappers, `creator` an object or null, `attachments` an array. The
//! shaper de-wraps and null-filters the tag list (join order preserved)
//! and passes creator and attachments through. A missing or malformed
//! relation field degrades to empty/absent instead of failing the fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::profile::ProfileView;
use crate::models::workshop::WorkshopSource;
use crate::models::{Attachment, Tag};

/// Raw row from a list/detail query: workshop columns plus JSON-encoded
/// relations.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkshopRecord {
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
    pub creator: Option<Value>,
    pub tags: Value,
    pub attachments: Value,
}

/// Flat workshop view consumed by API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopView {
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
    pub creator: Option<ProfileView>,
    pub tags: Vec<Tag>,
    pub attachments: Vec<Attachment>,
}

/// Shape a raw record into a flat view model.
pub fn shape_workshop(record: WorkshopRecord) -> WorkshopView {
    let tags = shape_tags(&record.tags);
    let creator = record
        .creator
        .and_then(|value| serde_json::from_value::<ProfileView>(value).ok());
    let attachments =
        serde_json::from_value::<Vec<Attachment>>(record.attachments).unwrap_or_default();

    WorkshopView {
        id: record.id,
        title: record.title,
        description: record.description,
        content: record.content,
        duration_minutes: record.duration_minutes,
        participants_min: record.participants_min,
        participants_max: record.participants_max,
        materials: record.materials,
        objectives: record.objectives,
        creator_id: record.creator_id,
        source: record.source,
        source_id: record.source_id,
        source_url: record.source_url,
        created_at: record.created_at,
        updated_at: record.updated_at,
        creator,
        tags,
        attachments,
    }
}

/// De-wrap a `[{"tag": {...}}, ...]` join payload into a plain tag list.
///
/// Entries without a decodable `tag` object are dropped; anything other
/// than an array (missing field, already-flat list, garbage) yields an
/// empty list rather than an error.
pub fn shape_tags(value: &Value) -> Vec<Tag> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| entry.get("tag"))
        .filter_map(|tag| serde_json::from_value::<Tag>(tag.clone()).ok())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tag_json(name: &str) -> Value {
        json!({
            "id": Uuid::now_v7(),
            "name": name,
            "category": "custom",
            "color": "#003a5d",
            "created_at": "2026-08-30T10:00:00+00:00"
        })
    }

    fn record_with(tags: Value, creator: Option<Value>, attachments: Value) -> WorkshopRecord {
        WorkshopRecord {
            id: Uuid::now_v7(),
            title: "Atelier maquette".to_string(),
            description: None,
            content: None,
            duration_minutes: Some(90),
            participants_min: Some(4),
            participants_max: Some(12),
            materials: vec!["post-its".to_string()],
            objectives: vec![],
            creator_id: None,
            source: WorkshopSource::Manual,
            source_id: None,
            source_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            creator,
            tags,
            attachments,
        }
    }

    #[test]
    fn dewraps_tag_join_rows_in_order() {
        let tags = json!([
            { "tag": tag_json("énergie") },
            { "tag": tag_json("climat") },
        ]);

        let shaped = shape_tags(&tags);
        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped[0].name, "énergie");
        assert_eq!(shaped[1].name, "climat");
    }

    #[test]
    fn null_and_malformed_entries_are_dropped() {
        let tags = json!([
            { "tag": tag_json("ok") },
            { "tag": null },
            { "other": 1 },
            42,
            { "tag": { "id": "not-a-uuid" } },
        ]);

        let shaped = shape_tags(&tags);
        assert_eq!(shaped.len(), 1);
        assert_eq!(shaped[0].name, "ok");
    }

    #[test]
    fn already_flat_tags_default_to_empty() {
        // A flat tag list has no join wrappers; nothing decodes, nothing throws.
        let flat = json!([tag_json("flat")]);
        assert!(shape_tags(&flat).is_empty());
    }

    #[test]
    fn non_array_tags_default_to_empty() {
        assert!(shape_tags(&Value::Null).is_empty());
        assert!(shape_tags(&json!("garbage")).is_empty());
        assert!(shape_tags(&json!({ "tag": tag_json("x") })).is_empty());
    }

    #[test]
    fn shaping_tolerates_missing_relations() {
        let view = shape_workshop(record_with(Value::Null, None, Value::Null));
        assert!(view.tags.is_empty());
        assert!(view.creator.is_none());
        assert!(view.attachments.is_empty());
        assert_eq!(view.title, "Atelier maquette");
    }

    #[test]
    fn creator_and_attachments_pass_through() {
        let creator_id = Uuid::now_v7();
        let creator = json!({
            "id": creator_id,
            "email": "lea@example.org",
            "full_name": "Léa",
            "role": "contributor",
            "avatar_path": null,
            "created_at": "2026-08-30T10:00:00+00:00",
            "updated_at": "2026-08-30T10:00:00+00:00"
        });
        let attachments = json!([{
            "id": Uuid::now_v7(),
            "workshop_id": Uuid::now_v7(),
            "file_name": "fiche.pdf",
            "file_path": "local://2026/08/abcd1234_fiche.pdf",
            "file_type": "application/pdf",
            "file_size": 1024,
            "uploaded_by": null,
            "created_at": "2026-08-30T10:00:00+00:00"
        }]);

        let view = shape_workshop(record_with(json!([]), Some(creator), attachments));
        assert_eq!(view.creator.unwrap().id, creator_id);
        assert_eq!(view.attachments.len(), 1);
        assert_eq!(view.attachments[0].file_name, "fiche.pdf");
        assert!(view.tags.is_empty());
    }

    #[test]
    fn malformed_creator_degrades_to_none() {
        let view = shape_workshop(record_with(
            json!([]),
            Some(json!({ "id": "nope" })),
            json!([]),
        ));
        assert!(view.creator.is_none());
    }
}
