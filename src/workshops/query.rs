//! Workshop list/detail queries against Postgres.
//!
//! Executes the plans produced by [`super::filter`] and shapes the rows
//! through [`super::shape`]. Any underlying query failure aborts the
//! whole fetch; there is no partial-result fallback.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::search::SearchService;

use super::filter::{plan_list_query, Bind, QueryPlan, WorkshopFilter};
use super::shape::{shape_workshop, WorkshopRecord, WorkshopView};

/// Shared SELECT for list/detail queries: workshop columns plus the
/// creator, tag join wrappers, and attachments aggregated as JSON. The
/// creator object is stripped of its password hash before it leaves the
/// database.
const WORKSHOP_SELECT: &str = r#"
SELECT
    w.id, w.title, w.description, w.content, w.duration_minutes,
    w.participants_min, w.participants_max, w.materials, w.objectives,
    w.creator_id, w.source, w.source_id, w.source_url, w.created_at,
    w.updated_at,
    to_jsonb(p) - 'password_hash' AS creator,
    COALESCE(tg.tags, '[]'::jsonb) AS tags,
    COALESCE(att.attachments, '[]'::jsonb) AS attachments
FROM workshops w
LEFT JOIN profiles p ON p.id = w.creator_id
LEFT JOIN LATERAL (
    SELECT jsonb_agg(jsonb_build_object('tag', to_jsonb(t)) ORDER BY wt.created_at) AS tags
    FROM workshop_tags wt
    JOIN tags t ON t.id = wt.tag_id
    WHERE wt.workshop_id = w.id
) tg ON TRUE
LEFT JOIN LATERAL (
    SELECT jsonb_agg(to_jsonb(a) ORDER BY a.created_at) AS attachments
    FROM attachments a
    WHERE a.workshop_id = w.id
) att ON TRUE
"#;

/// List workshops matching the filter, newest first.
pub async fn list_workshops(
    pool: &PgPool,
    search: &SearchService,
    filter: &WorkshopFilter,
) -> Result<Vec<WorkshopView>> {
    let search_ids = match filter.search_term() {
        Some(term) => Some(search.matching_ids(term).await?),
        None => None,
    };

    let tagged_ids = if filter.tag_ids.is_empty() {
        None
    } else {
        Some(tagged_workshop_ids(pool, &filter.tag_ids).await?)
    };

    let plan = match plan_list_query(filter, search_ids, tagged_ids) {
        QueryPlan::Empty => return Ok(Vec::new()),
        QueryPlan::Select(plan) => plan,
    };

    let mut sql = WORKSHOP_SELECT.to_string();
    if let Some(clause) = plan.where_clause() {
        sql.push_str("WHERE ");
        sql.push_str(&clause);
        sql.push('\n');
    }
    sql.push_str("ORDER BY w.created_at DESC");

    let mut query = sqlx::query_as::<_, WorkshopRecord>(&sql);
    for bind in plan.binds() {
        query = match bind {
            Bind::Uuid(v) => query.bind(*v),
            Bind::UuidList(v) => query.bind(v.clone()),
            Bind::Timestamp(v) => query.bind(*v),
            Bind::Int(v) => query.bind(*v),
        };
    }

    let records = query
        .fetch_all(pool)
        .await
        .context("failed to list workshops")?;

    Ok(records.into_iter().map(shape_workshop).collect())
}

/// Fetch a single workshop with its relations.
pub async fn get_workshop(pool: &PgPool, id: Uuid) -> Result<Option<WorkshopView>> {
    let sql = format!("{WORKSHOP_SELECT}WHERE w.id = $1");

    let record = sqlx::query_as::<_, WorkshopRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch workshop")?;

    Ok(record.map(shape_workshop))
}

/// Resolve tag ids to the de-duplicated set of workshop ids carrying
/// any of them (OR across tags).
async fn tagged_workshop_ids(pool: &PgPool, tag_ids: &[Uuid]) -> Result<Vec<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT DISTINCT workshop_id FROM workshop_tags WHERE tag_id = ANY($1)",
    )
    .bind(tag_ids.to_vec())
    .fetch_all(pool)
    .await
    .context("failed to resolve tagged workshop ids")?;

    Ok(ids)
}
