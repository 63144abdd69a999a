//! Full-text workshop search.
//!
//! Uses the `search_vector` tsvector column (GIN-indexed) over title,
//! description, and content. The service resolves a free-text query to
//! a relevance-ordered list of workshop ids; the list query then scopes
//! itself to those ids.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Search service backed by Postgres full-text search.
#[derive(Clone)]
pub struct SearchService {
    pool: PgPool,
}

impl SearchService {
    /// Create a new search service.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a free-text query to ranked matching workshop ids.
    ///
    /// A blank query matches nothing. Title matches rank above
    /// description matches, which rank above content matches (the
    /// tsvector weights), with newest-first as the tiebreak.
    pub async fn matching_ids(&self, query: &str) -> Result<Vec<Uuid>> {
        let Some(ts_query) = build_ts_query(query) else {
            return Ok(Vec::new());
        };

        debug!(query = %query.trim(), ts_query = %ts_query, "executing workshop search");

        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id
            FROM workshops
            WHERE search_vector @@ to_tsquery('simple', $1)
            ORDER BY ts_rank(search_vector, to_tsquery('simple', $1)) DESC,
                     created_at DESC
            "#,
        )
        .bind(&ts_query)
        .fetch_all(&self.pool)
        .await
        .context("failed to search workshops")?;

        Ok(ids)
    }
}

/// Convert free text to tsquery form: whitespace-split words AND-ed
/// together with prefix matching. Returns None for a blank query.
fn build_ts_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(
        trimmed
            .split_whitespace()
            .map(|word| format!("{word}:*"))
            .collect::<Vec<_>>()
            .join(" & "),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_queries_build_nothing() {
        assert_eq!(build_ts_query(""), None);
        assert_eq!(build_ts_query("   "), None);
    }

    #[test]
    fn words_are_prefix_matched_and_anded() {
        assert_eq!(build_ts_query("lego"), Some("lego:*".to_string()));
        assert_eq!(
            build_ts_query("  atelier lego serious  "),
            Some("atelier:* & lego:* & serious:*".to_string())
        );
    }
}
