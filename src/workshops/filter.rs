//! Workshop filter model and query planning.
//!
//! A [`WorkshopFilter`] describes the desired subset of workshops.
//! [`plan_list_query`] turns it, together with the already-resolved
//! free-text and tag id lists, into a [`QueryPlan`]: either a
//! short-circuit to an empty result, or an ordered list of AND-ed SQL
//! conditions with their binds. Keeping this step free of IO makes the
//! composition rules directly testable.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Desired subset of workshops. Absent fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct WorkshopFilter {
    /// Free-text query, delegated to the ranking function.
    pub search: Option<String>,
    /// Tag ids combined with OR semantics (any match qualifies).
    pub tag_ids: Vec<Uuid>,
    pub creator_id: Option<Uuid>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub duration_min: Option<i32>,
    pub duration_max: Option<i32>,
    pub participants_min: Option<i32>,
    pub participants_max: Option<i32>,
}

impl WorkshopFilter {
    /// The trimmed search term, or None when the field is absent or
    /// whitespace-only.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A value bound into a planned query.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Uuid(Uuid),
    UuidList(Vec<Uuid>),
    Timestamp(DateTime<Utc>),
    Int(i32),
}

/// Outcome of planning a list query.
#[derive(Debug, Clone)]
pub enum QueryPlan {
    /// A resolved id filter matched nothing; the result is empty without
    /// touching the workshops table.
    Empty,
    /// Run a SELECT with the given conditions.
    Select(SelectPlan),
}

/// AND-ed SQL conditions with positional binds, numbered from `$1`.
#[derive(Debug, Clone, Default)]
pub struct SelectPlan {
    conditions: Vec<(String, Bind)>,
}

impl SelectPlan {
    /// Next positional placeholder number.
    fn next_placeholder(&self) -> usize {
        self.conditions.len() + 1
    }

    fn push(&mut self, sql: String, bind: Bind) {
        self.conditions.push((sql, bind));
    }

    fn push_compare(&mut self, column_expr: &str, op: &str, bind: Bind) {
        let n = self.next_placeholder();
        self.push(format!("{column_expr} {op} ${n}"), bind);
    }

    /// The WHERE clause body, or None when nothing constrains.
    pub fn where_clause(&self) -> Option<String> {
        if self.conditions.is_empty() {
            return None;
        }
        Some(
            self.conditions
                .iter()
                .map(|(sql, _)| sql.as_str())
                .collect::<Vec<_>>()
                .join(" AND "),
        )
    }

    /// Binds in placeholder order.
    pub fn binds(&self) -> impl Iterator<Item = &Bind> {
        self.conditions.iter().map(|(_, bind)| bind)
    }

    #[cfg(test)]
    fn fragments(&self) -> Vec<&str> {
        self.conditions.iter().map(|(sql, _)| sql.as_str()).collect()
    }
}

/// Compose the final query constraints from a filter and the id lists
/// resolved for its free-text and tag fields.
///
/// `search_ids` / `tagged_ids` are `None` when the corresponding filter
/// field is absent; `Some(vec![])` means the field was present but
/// matched nothing, which narrows the result to empty rather than
/// falling back to "no filter". When both lists are present they are
/// intersected, preserving the ranking order of `search_ids`.
///
/// Constraints all AND together. The participant bounds are a range
/// overlap, not an equality: a requested minimum keeps workshops whose
/// `participants_max` reaches it, and a requested maximum keeps
/// workshops whose `participants_min` stays under it. Workshops with a
/// NULL bound are excluded by the corresponding constraint (SQL NULL
/// comparison yields no match).
pub fn plan_list_query(
    filter: &WorkshopFilter,
    search_ids: Option<Vec<Uuid>>,
    tagged_ids: Option<Vec<Uuid>>,
) -> QueryPlan {
    let id_scope = match (search_ids, tagged_ids) {
        (None, None) => None,
        (Some(ids), None) | (None, Some(ids)) => Some(ids),
        (Some(ranked), Some(tagged)) => {
            Some(ranked.into_iter().filter(|id| tagged.contains(id)).collect())
        }
    };

    let mut plan = SelectPlan::default();

    if let Some(ids) = id_scope {
        if ids.is_empty() {
            return QueryPlan::Empty;
        }
        let n = plan.next_placeholder();
        plan.push(format!("w.id = ANY(${n})"), Bind::UuidList(ids));
    }

    if let Some(creator_id) = filter.creator_id {
        plan.push_compare("w.creator_id", "=", Bind::Uuid(creator_id));
    }
    if let Some(date_from) = filter.date_from {
        plan.push_compare("w.created_at", ">=", Bind::Timestamp(date_from));
    }
    if let Some(date_to) = filter.date_to {
        plan.push_compare("w.created_at", "<=", Bind::Timestamp(date_to));
    }
    if let Some(duration_min) = filter.duration_min {
        plan.push_compare("w.duration_minutes", ">=", Bind::Int(duration_min));
    }
    if let Some(duration_max) = filter.duration_max {
        plan.push_compare("w.duration_minutes", "<=", Bind::Int(duration_max));
    }
    if let Some(participants_min) = filter.participants_min {
        plan.push_compare("w.participants_max", ">=", Bind::Int(participants_min));
    }
    if let Some(participants_max) = filter.participants_max {
        plan.push_compare("w.participants_min", "<=", Bind::Int(participants_max));
    }

    QueryPlan::Select(plan)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn select(plan: QueryPlan) -> SelectPlan {
        match plan {
            QueryPlan::Select(plan) => plan,
            QueryPlan::Empty => panic!("expected a SELECT plan"),
        }
    }

    #[test]
    fn empty_filter_has_no_conditions() {
        let plan = select(plan_list_query(&WorkshopFilter::default(), None, None));
        assert!(plan.where_clause().is_none());
        assert_eq!(plan.binds().count(), 0);
    }

    #[test]
    fn search_matching_nothing_short_circuits() {
        let filter = WorkshopFilter {
            search: Some("introuvable".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            plan_list_query(&filter, Some(vec![]), None),
            QueryPlan::Empty
        ));
    }

    #[test]
    fn tags_matching_nothing_short_circuit() {
        let filter = WorkshopFilter {
            tag_ids: vec![Uuid::now_v7()],
            ..Default::default()
        };
        assert!(matches!(
            plan_list_query(&filter, None, Some(vec![])),
            QueryPlan::Empty
        ));
    }

    #[test]
    fn search_and_tags_intersect() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();

        let plan = select(plan_list_query(
            &WorkshopFilter::default(),
            Some(vec![a, b]),
            Some(vec![b, c]),
        ));
        assert_eq!(plan.binds().next(), Some(&Bind::UuidList(vec![b])));
    }

    #[test]
    fn disjoint_search_and_tags_short_circuit() {
        let plan = plan_list_query(
            &WorkshopFilter::default(),
            Some(vec![Uuid::now_v7()]),
            Some(vec![Uuid::now_v7()]),
        );
        assert!(matches!(plan, QueryPlan::Empty));
    }

    #[test]
    fn intersection_preserves_ranking_order() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        let plan = select(plan_list_query(
            &WorkshopFilter::default(),
            Some(vec![b, a]),
            Some(vec![a, b]),
        ));
        assert_eq!(plan.binds().next(), Some(&Bind::UuidList(vec![b, a])));
    }

    #[test]
    fn all_present_constraints_conjoin() {
        let creator = Uuid::now_v7();
        let filter = WorkshopFilter {
            creator_id: Some(creator),
            duration_min: Some(30),
            duration_max: Some(120),
            ..Default::default()
        };

        let plan = select(plan_list_query(&filter, None, None));
        let clause = plan.where_clause().unwrap();
        assert_eq!(
            clause,
            "w.creator_id = $1 AND w.duration_minutes >= $2 AND w.duration_minutes <= $3"
        );
        let binds: Vec<_> = plan.binds().cloned().collect();
        assert_eq!(
            binds,
            vec![Bind::Uuid(creator), Bind::Int(30), Bind::Int(120)]
        );
    }

    #[test]
    fn participant_bounds_use_opposite_columns() {
        let filter = WorkshopFilter {
            participants_min: Some(10),
            participants_max: Some(25),
            ..Default::default()
        };

        let plan = select(plan_list_query(&filter, None, None));
        assert_eq!(
            plan.fragments(),
            vec!["w.participants_max >= $1", "w.participants_min <= $2"]
        );
    }

    #[test]
    fn date_bounds_constrain_created_at() {
        let from = Utc::now();
        let filter = WorkshopFilter {
            date_from: Some(from),
            ..Default::default()
        };

        let plan = select(plan_list_query(&filter, None, None));
        assert_eq!(plan.fragments(), vec!["w.created_at >= $1"]);
        assert_eq!(plan.binds().next(), Some(&Bind::Timestamp(from)));
    }

    #[test]
    fn placeholders_number_sequentially_after_id_scope() {
        let filter = WorkshopFilter {
            creator_id: Some(Uuid::now_v7()),
            participants_min: Some(5),
            ..Default::default()
        };

        let plan = select(plan_list_query(&filter, Some(vec![Uuid::now_v7()]), None));
        assert_eq!(
            plan.fragments(),
            vec![
                "w.id = ANY($1)",
                "w.creator_id = $2",
                "w.participants_max >= $3"
            ]
        );
    }

    #[test]
    fn search_term_trims_and_drops_blank() {
        let blank = WorkshopFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.search_term(), None);

        let padded = WorkshopFilter {
            search: Some("  lego  ".to_string()),
            ..Default::default()
        };
        assert_eq!(padded.search_term(), Some("lego"));
    }
}
